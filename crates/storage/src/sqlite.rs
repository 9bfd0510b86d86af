use std::collections::BTreeMap;

use rusqlite::Connection;

use opencatalog_core::{
    attribute::{Attribute, AttributeType},
    entities::{Channel, Product},
    field_value::FieldValue,
    ids::*,
    locale::Locale,
    record::{AttributeValueRecord, Scope},
};

use crate::error::StorageError;
use crate::traits::{JobRecord, Store};

/// Convert Vec<u8> to fixed-size array with proper error handling.
fn to_array<const N: usize>(v: Vec<u8>, label: &str) -> Result<[u8; N], StorageError> {
    v.try_into()
        .map_err(|_| StorageError::Serialization(format!("invalid {label} length")))
}

fn pack<T: serde::Serialize>(value: &T, label: &str) -> Result<Vec<u8>, StorageError> {
    rmp_serde::to_vec(value)
        .map_err(|e| StorageError::Serialization(format!("{label}: {e}")))
}

fn unpack<T: serde::de::DeserializeOwned>(bytes: &[u8], label: &str) -> Result<T, StorageError> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| StorageError::Serialization(format!("{label}: {e}")))
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    fn load_value_fields(
        &self,
        id: AttributeValueId,
    ) -> Result<BTreeMap<String, FieldValue>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT field_key, value FROM attribute_value_fields WHERE value_id = ?1")?;
        let rows = stmt.query_map(rusqlite::params![id.as_bytes().as_slice()], |row| {
            let key: String = row.get(0)?;
            let val_bytes: Vec<u8> = row.get(1)?;
            Ok((key, val_bytes))
        })?;

        let mut fields = BTreeMap::new();
        for row in rows {
            let (key, val_bytes) = row?;
            let value = FieldValue::from_msgpack(&val_bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            fields.insert(key, value);
        }
        Ok(fields)
    }

    fn record_from_row(
        &self,
        raw: RawValueRow,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<AttributeValueRecord, StorageError> {
        let locale = match raw.locale {
            Some(code) => Some(Locale::parse(&code)?),
            None => None,
        };
        Ok(AttributeValueRecord {
            id: AttributeValueId::from_bytes(to_array::<16>(raw.id, "id")?),
            product_id: ProductId::from_bytes(to_array::<16>(raw.product_id, "product_id")?),
            attribute_id: AttributeId::from_bytes(to_array::<16>(raw.attribute_id, "attribute_id")?),
            scope: Scope::parse(&raw.scope)?,
            channel_id: match raw.channel_id {
                Some(b) => Some(ChannelId::from_bytes(to_array::<16>(b, "channel_id")?)),
                None => None,
            },
            locale,
            product_family_attribute_id: match raw.product_family_attribute_id {
                Some(b) => Some(FamilyAttributeId::from_bytes(to_array::<16>(
                    b,
                    "product_family_attribute_id",
                )?)),
                None => None,
            },
            is_required: raw.is_required,
            deleted: raw.deleted,
            modified_at: raw.modified_at,
            fields,
        })
    }
}

struct RawValueRow {
    id: Vec<u8>,
    product_id: Vec<u8>,
    attribute_id: Vec<u8>,
    scope: String,
    channel_id: Option<Vec<u8>>,
    locale: Option<String>,
    product_family_attribute_id: Option<Vec<u8>>,
    is_required: bool,
    deleted: bool,
    modified_at: i64,
}

const VALUE_ROW_COLUMNS: &str = "id, product_id, attribute_id, scope, channel_id, locale, \
     product_family_attribute_id, is_required, deleted, modified_at";

fn read_raw_value_row(row: &rusqlite::Row) -> Result<RawValueRow, rusqlite::Error> {
    Ok(RawValueRow {
        id: row.get(0)?,
        product_id: row.get(1)?,
        attribute_id: row.get(2)?,
        scope: row.get(3)?,
        channel_id: row.get(4)?,
        locale: row.get(5)?,
        product_family_attribute_id: row.get(6)?,
        is_required: row.get(7)?,
        deleted: row.get(8)?,
        modified_at: row.get(9)?,
    })
}

impl Store for SqliteStore {
    fn insert_product(&mut self, product: &Product) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO products (id, name, assigned_user, owner_user, teams, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name,
                 assigned_user = excluded.assigned_user, owner_user = excluded.owner_user,
                 teams = excluded.teams, modified_at = excluded.modified_at",
            rusqlite::params![
                product.id.as_bytes().as_slice(),
                product.name,
                product.assigned_user.as_ref().map(|u| u.as_bytes().as_slice()),
                product.owner_user.as_ref().map(|u| u.as_bytes().as_slice()),
                pack(&product.teams, "teams")?,
                product.modified_at,
            ],
        )?;
        self.conn.execute(
            "DELETE FROM product_channels WHERE product_id = ?1",
            rusqlite::params![product.id.as_bytes().as_slice()],
        )?;
        for channel_id in &product.channel_ids {
            self.conn.execute(
                "INSERT INTO product_channels (product_id, channel_id) VALUES (?1, ?2)",
                rusqlite::params![
                    product.id.as_bytes().as_slice(),
                    channel_id.as_bytes().as_slice(),
                ],
            )?;
        }
        Ok(())
    }

    fn get_product(&self, id: ProductId) -> Result<Option<Product>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, assigned_user, owner_user, teams, modified_at
             FROM products WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(rusqlite::params![id.as_bytes().as_slice()], |row| {
            let id_bytes: Vec<u8> = row.get(0)?;
            let name: String = row.get(1)?;
            let assigned: Option<Vec<u8>> = row.get(2)?;
            let owner: Option<Vec<u8>> = row.get(3)?;
            let teams_bytes: Vec<u8> = row.get(4)?;
            let modified_at: i64 = row.get(5)?;
            Ok((id_bytes, name, assigned, owner, teams_bytes, modified_at))
        })?;

        let (id_bytes, name, assigned, owner, teams_bytes, modified_at) = match rows.next() {
            Some(row) => row?,
            None => return Ok(None),
        };

        let mut stmt = self
            .conn
            .prepare("SELECT channel_id FROM product_channels WHERE product_id = ?1")?;
        let channel_rows = stmt.query_map(rusqlite::params![id.as_bytes().as_slice()], |row| {
            row.get::<_, Vec<u8>>(0)
        })?;
        let mut channel_ids = Vec::new();
        for row in channel_rows {
            channel_ids.push(ChannelId::from_bytes(to_array::<16>(row?, "channel_id")?));
        }

        Ok(Some(Product {
            id: ProductId::from_bytes(to_array::<16>(id_bytes, "product_id")?),
            name,
            assigned_user: match assigned {
                Some(b) => Some(UserId::from_bytes(to_array::<16>(b, "assigned_user")?)),
                None => None,
            },
            owner_user: match owner {
                Some(b) => Some(UserId::from_bytes(to_array::<16>(b, "owner_user")?)),
                None => None,
            },
            teams: unpack(&teams_bytes, "teams")?,
            channel_ids,
            modified_at,
        }))
    }

    fn set_product_modified_at(
        &mut self,
        id: ProductId,
        modified_at: i64,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "UPDATE products SET modified_at = ?1 WHERE id = ?2",
            rusqlite::params![modified_at, id.as_bytes().as_slice()],
        )?;
        Ok(())
    }

    fn insert_attribute(&mut self, attribute: &Attribute) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO attributes
                 (id, name, attr_type, is_multilang, type_value, option_labels,
                  assigned_user, owner_user, teams)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name,
                 attr_type = excluded.attr_type, is_multilang = excluded.is_multilang,
                 type_value = excluded.type_value, option_labels = excluded.option_labels,
                 assigned_user = excluded.assigned_user, owner_user = excluded.owner_user,
                 teams = excluded.teams",
            rusqlite::params![
                attribute.id.as_bytes().as_slice(),
                attribute.name,
                attribute.attr_type.as_str(),
                attribute.is_multilang,
                pack(&attribute.type_value, "type_value")?,
                pack(&attribute.option_labels, "option_labels")?,
                attribute.assigned_user.as_ref().map(|u| u.as_bytes().as_slice()),
                attribute.owner_user.as_ref().map(|u| u.as_bytes().as_slice()),
                pack(&attribute.teams, "teams")?,
            ],
        )?;
        Ok(())
    }

    fn get_attribute(&self, id: AttributeId) -> Result<Option<Attribute>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, attr_type, is_multilang, type_value, option_labels,
                    assigned_user, owner_user, teams
             FROM attributes WHERE id = ?1",
        )?;
        let mut rows = stmt.query_map(rusqlite::params![id.as_bytes().as_slice()], |row| {
            let id_bytes: Vec<u8> = row.get(0)?;
            let name: String = row.get(1)?;
            let attr_type: String = row.get(2)?;
            let is_multilang: bool = row.get(3)?;
            let type_value: Vec<u8> = row.get(4)?;
            let option_labels: Vec<u8> = row.get(5)?;
            let assigned: Option<Vec<u8>> = row.get(6)?;
            let owner: Option<Vec<u8>> = row.get(7)?;
            let teams: Vec<u8> = row.get(8)?;
            Ok((
                id_bytes,
                name,
                attr_type,
                is_multilang,
                type_value,
                option_labels,
                assigned,
                owner,
                teams,
            ))
        })?;

        match rows.next() {
            Some(row) => {
                let (
                    id_bytes,
                    name,
                    attr_type,
                    is_multilang,
                    type_value,
                    option_labels,
                    assigned,
                    owner,
                    teams,
                ) = row?;
                Ok(Some(Attribute {
                    id: AttributeId::from_bytes(to_array::<16>(id_bytes, "attribute_id")?),
                    name,
                    attr_type: AttributeType::parse(&attr_type)?,
                    is_multilang,
                    type_value: unpack(&type_value, "type_value")?,
                    option_labels: unpack(&option_labels, "option_labels")?,
                    assigned_user: match assigned {
                        Some(b) => Some(UserId::from_bytes(to_array::<16>(b, "assigned_user")?)),
                        None => None,
                    },
                    owner_user: match owner {
                        Some(b) => Some(UserId::from_bytes(to_array::<16>(b, "owner_user")?)),
                        None => None,
                    },
                    teams: unpack(&teams, "teams")?,
                }))
            }
            None => Ok(None),
        }
    }

    fn insert_channel(&mut self, channel: &Channel) -> Result<(), StorageError> {
        let locales = if channel.locales.is_empty() {
            None
        } else {
            Some(pack(&channel.locales, "locales")?)
        };
        self.conn.execute(
            "INSERT INTO channels (id, name, locales) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, locales = excluded.locales",
            rusqlite::params![channel.id.as_bytes().as_slice(), channel.name, locales],
        )?;
        Ok(())
    }

    fn get_channel(&self, id: ChannelId) -> Result<Option<Channel>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, locales FROM channels WHERE id = ?1")?;
        let mut rows = stmt.query_map(rusqlite::params![id.as_bytes().as_slice()], |row| {
            let id_bytes: Vec<u8> = row.get(0)?;
            let name: String = row.get(1)?;
            let locales: Option<Vec<u8>> = row.get(2)?;
            Ok((id_bytes, name, locales))
        })?;

        match rows.next() {
            Some(row) => {
                let (id_bytes, name, locales) = row?;
                Ok(Some(Channel {
                    id: ChannelId::from_bytes(to_array::<16>(id_bytes, "channel_id")?),
                    name,
                    locales: match locales {
                        Some(b) => unpack(&b, "locales")?,
                        None => Vec::new(),
                    },
                }))
            }
            None => Ok(None),
        }
    }

    fn all_channels(&self) -> Result<Vec<Channel>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT id, name, locales FROM channels")?;
        let rows = stmt.query_map([], |row| {
            let id_bytes: Vec<u8> = row.get(0)?;
            let name: String = row.get(1)?;
            let locales: Option<Vec<u8>> = row.get(2)?;
            Ok((id_bytes, name, locales))
        })?;

        let mut channels = Vec::new();
        for row in rows {
            let (id_bytes, name, locales) = row?;
            channels.push(Channel {
                id: ChannelId::from_bytes(to_array::<16>(id_bytes, "channel_id")?),
                name,
                locales: match locales {
                    Some(b) => unpack(&b, "locales")?,
                    None => Vec::new(),
                },
            });
        }
        Ok(channels)
    }

    fn set_channel_locales(
        &mut self,
        id: ChannelId,
        locales: &[Locale],
    ) -> Result<(), StorageError> {
        let blob = if locales.is_empty() {
            None
        } else {
            Some(pack(&locales, "locales")?)
        };
        self.conn.execute(
            "UPDATE channels SET locales = ?1 WHERE id = ?2",
            rusqlite::params![blob, id.as_bytes().as_slice()],
        )?;
        Ok(())
    }

    fn clear_all_channel_locales(&mut self) -> Result<(), StorageError> {
        self.conn.execute("UPDATE channels SET locales = NULL", [])?;
        Ok(())
    }

    fn upsert_attribute_value(
        &mut self,
        record: &AttributeValueRecord,
    ) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO attribute_values
                 (id, product_id, attribute_id, scope, channel_id, locale,
                  product_family_attribute_id, is_required, deleted, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                 product_id = excluded.product_id, attribute_id = excluded.attribute_id,
                 scope = excluded.scope, channel_id = excluded.channel_id,
                 locale = excluded.locale,
                 product_family_attribute_id = excluded.product_family_attribute_id,
                 is_required = excluded.is_required, deleted = excluded.deleted,
                 modified_at = excluded.modified_at",
            rusqlite::params![
                record.id.as_bytes().as_slice(),
                record.product_id.as_bytes().as_slice(),
                record.attribute_id.as_bytes().as_slice(),
                record.scope.as_str(),
                record.channel_id.as_ref().map(|c| c.as_bytes().as_slice()),
                record.locale.as_ref().map(|l| l.code()),
                record
                    .product_family_attribute_id
                    .as_ref()
                    .map(|f| f.as_bytes().as_slice()),
                record.is_required,
                record.deleted,
                record.modified_at,
            ],
        )?;

        // Rewrite the field bag wholesale; callers control transaction scope.
        self.conn.execute(
            "DELETE FROM attribute_value_fields WHERE value_id = ?1",
            rusqlite::params![record.id.as_bytes().as_slice()],
        )?;
        let mut stmt = self.conn.prepare(
            "INSERT INTO attribute_value_fields (value_id, field_key, value) VALUES (?1, ?2, ?3)",
        )?;
        for (key, value) in &record.fields {
            let value_bytes = value
                .to_msgpack()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            stmt.execute(rusqlite::params![
                record.id.as_bytes().as_slice(),
                key,
                value_bytes,
            ])?;
        }
        Ok(())
    }

    fn get_attribute_value(
        &self,
        id: AttributeValueId,
    ) -> Result<Option<AttributeValueRecord>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VALUE_ROW_COLUMNS} FROM attribute_values WHERE id = ?1"
        ))?;
        let mut rows = stmt.query_map(
            rusqlite::params![id.as_bytes().as_slice()],
            read_raw_value_row,
        )?;

        match rows.next() {
            Some(row) => {
                let raw = row?;
                let fields = self.load_value_fields(id)?;
                Ok(Some(self.record_from_row(raw, fields)?))
            }
            None => Ok(None),
        }
    }

    fn find_copy(
        &self,
        record: &AttributeValueRecord,
    ) -> Result<Option<AttributeValueId>, StorageError> {
        let mut sql = String::from(
            "SELECT id FROM attribute_values
             WHERE id != ?1 AND product_id = ?2 AND attribute_id = ?3
               AND scope = ?4 AND locale IS ?5 AND deleted = 0",
        );
        if record.scope == Scope::Channel {
            sql.push_str(" AND channel_id IS ?6");
        }
        sql.push_str(" LIMIT 1");

        let mut stmt = self.conn.prepare(&sql)?;
        let locale = record.locale.as_ref().map(|l| l.code());
        let id_bytes: Option<Vec<u8>> = if record.scope == Scope::Channel {
            let channel = record.channel_id.as_ref().map(|c| c.as_bytes().as_slice());
            let mut rows = stmt.query_map(
                rusqlite::params![
                    record.id.as_bytes().as_slice(),
                    record.product_id.as_bytes().as_slice(),
                    record.attribute_id.as_bytes().as_slice(),
                    record.scope.as_str(),
                    locale,
                    channel,
                ],
                |row| row.get::<_, Vec<u8>>(0),
            )?;
            rows.next().transpose()?
        } else {
            let mut rows = stmt.query_map(
                rusqlite::params![
                    record.id.as_bytes().as_slice(),
                    record.product_id.as_bytes().as_slice(),
                    record.attribute_id.as_bytes().as_slice(),
                    record.scope.as_str(),
                    locale,
                ],
                |row| row.get::<_, Vec<u8>>(0),
            )?;
            rows.next().transpose()?
        };

        match id_bytes {
            Some(b) => Ok(Some(AttributeValueId::from_bytes(to_array::<16>(b, "id")?))),
            None => Ok(None),
        }
    }

    fn live_attribute_values(&self) -> Result<Vec<AttributeValueRecord>, StorageError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {VALUE_ROW_COLUMNS} FROM attribute_values WHERE deleted = 0"
        ))?;
        let rows = stmt.query_map([], read_raw_value_row)?;

        let mut raws = Vec::new();
        for row in rows {
            raws.push(row?);
        }

        let mut records = Vec::new();
        for raw in raws {
            let id = AttributeValueId::from_bytes(to_array::<16>(raw.id.clone(), "id")?);
            let fields = self.load_value_fields(id)?;
            records.push(self.record_from_row(raw, fields)?);
        }
        Ok(records)
    }

    fn remove_by_family_attribute(
        &mut self,
        id: FamilyAttributeId,
    ) -> Result<usize, StorageError> {
        let changed = self.conn.execute(
            "UPDATE attribute_values SET deleted = 1
             WHERE product_family_attribute_id = ?1 AND deleted = 0",
            rusqlite::params![id.as_bytes().as_slice()],
        )?;
        Ok(changed)
    }

    fn load_config(&self) -> Result<BTreeMap<String, serde_json::Value>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM config")?;
        let rows = stmt.query_map([], |row| {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok((key, value))
        })?;

        let mut values = BTreeMap::new();
        for row in rows {
            let (key, raw) = row?;
            let value: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|e| StorageError::Serialization(format!("config {key}: {e}")))?;
            values.insert(key, value);
        }
        Ok(values)
    }

    fn save_config(
        &mut self,
        values: &BTreeMap<String, serde_json::Value>,
    ) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM config", [])?;
        {
            let mut stmt = tx.prepare("INSERT INTO config (key, value) VALUES (?1, ?2)")?;
            for (key, value) in values {
                let raw = serde_json::to_string(value)
                    .map_err(|e| StorageError::Serialization(format!("config {key}: {e}")))?;
                stmt.execute(rusqlite::params![key, raw])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn enqueue_job(
        &mut self,
        description: &str,
        job_type: &str,
        payload: &serde_json::Value,
        priority: i64,
    ) -> Result<JobId, StorageError> {
        let id = JobId::new();
        let raw = serde_json::to_string(payload)
            .map_err(|e| StorageError::Serialization(format!("job payload: {e}")))?;
        self.conn.execute(
            "INSERT INTO job_queue (id, description, job_type, payload, priority, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, CAST(unixepoch('now','subsec') * 1000 AS INTEGER))",
            rusqlite::params![id.as_bytes().as_slice(), description, job_type, raw, priority],
        )?;
        Ok(id)
    }

    fn list_jobs(&self) -> Result<Vec<JobRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, job_type, payload, priority, created_at
             FROM job_queue ORDER BY created_at, id",
        )?;
        let rows = stmt.query_map([], |row| {
            let id_bytes: Vec<u8> = row.get(0)?;
            let description: String = row.get(1)?;
            let job_type: String = row.get(2)?;
            let payload: String = row.get(3)?;
            let priority: i64 = row.get(4)?;
            let created_at: i64 = row.get(5)?;
            Ok((id_bytes, description, job_type, payload, priority, created_at))
        })?;

        let mut jobs = Vec::new();
        for row in rows {
            let (id_bytes, description, job_type, payload, priority, created_at) = row?;
            jobs.push(JobRecord {
                id: JobId::from_bytes(to_array::<16>(id_bytes, "job_id")?),
                description,
                job_type,
                payload: serde_json::from_str(&payload)
                    .map_err(|e| StorageError::Serialization(format!("job payload: {e}")))?,
                priority,
                created_at,
            });
        }
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencatalog_core::record::Scope;

    fn sample_record() -> AttributeValueRecord {
        let mut record = AttributeValueRecord::new(ProductId::new(), AttributeId::new());
        record.scope = Scope::Channel;
        record.channel_id = Some(ChannelId::new());
        record.modified_at = 1234;
        record.set_field("value", FieldValue::Text("red".into()));
        record.set_field("isInheritTeams", FieldValue::Boolean(true));
        record
    }

    #[test]
    fn attribute_value_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let record = sample_record();
        store.upsert_attribute_value(&record).unwrap();

        let loaded = store.get_attribute_value(record.id).unwrap().unwrap();
        assert_eq!(loaded, record);

        // Upsert replaces the field bag wholesale.
        let mut updated = record.clone();
        updated.fields.remove("isInheritTeams");
        updated.set_field("value", FieldValue::Text("green".into()));
        store.upsert_attribute_value(&updated).unwrap();

        let loaded = store.get_attribute_value(record.id).unwrap().unwrap();
        assert_eq!(loaded, updated);
    }

    #[test]
    fn find_copy_excludes_own_row_and_deleted() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let record = sample_record();
        store.upsert_attribute_value(&record).unwrap();

        // The record itself is not its own copy.
        assert!(store.find_copy(&record).unwrap().is_none());

        let mut twin = record.clone();
        twin.id = AttributeValueId::new();
        assert_eq!(store.find_copy(&twin).unwrap(), Some(record.id));

        let mut deleted = record.clone();
        deleted.deleted = true;
        store.upsert_attribute_value(&deleted).unwrap();
        assert!(store.find_copy(&twin).unwrap().is_none());
    }

    #[test]
    fn find_copy_separates_locale_variants() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let record = sample_record();
        store.upsert_attribute_value(&record).unwrap();

        let mut variant = record.clone();
        variant.id = AttributeValueId::new();
        variant.locale = Some(Locale::parse("de_DE").unwrap());
        assert!(store.find_copy(&variant).unwrap().is_none());
    }

    #[test]
    fn config_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.db");
        let path = path.to_str().unwrap();

        let mut values = BTreeMap::new();
        values.insert(
            "isMultilangActive".to_string(),
            serde_json::Value::Bool(true),
        );
        {
            let mut store = SqliteStore::open(path).unwrap();
            store.save_config(&values).unwrap();
        }

        let store = SqliteStore::open(path).unwrap();
        assert_eq!(store.load_config().unwrap(), values);
    }
}

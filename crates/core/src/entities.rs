use serde::{Deserialize, Serialize};

use crate::ids::{ChannelId, ProductId, TeamId, UserId};
use crate::locale::Locale;

/// The parent product of an attribute value. Only the slice of the product
/// the save pipeline touches: ownership fields, channel associations and the
/// modification timestamp that gets propagated on every child save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub assigned_user: Option<UserId>,
    pub owner_user: Option<UserId>,
    pub teams: Vec<TeamId>,
    pub channel_ids: Vec<ChannelId>,
    pub modified_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    /// Subset of the globally active locales this channel serves.
    pub locales: Vec<Locale>,
}

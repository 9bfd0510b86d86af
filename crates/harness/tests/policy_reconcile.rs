use opencatalog_core::locale::Locale;
use opencatalog_engine::config::{
    Config, K_INPUT_LANGUAGE_LIST, K_IS_MULTILANG_ACTIVE, K_OWNER_USER_ATTRIBUTE_OWNERSHIP,
    K_TEAMS_ATTRIBUTE_OWNERSHIP, K_TEAMS_PRODUCT_OWNERSHIP,
};
use opencatalog_engine::{
    JobType, PolicyChangeReconciler, QueueDispatcher, ReconcileContext, SettingsUpdate,
    NORMAL_PRIORITY,
};
use opencatalog_harness::{FailingDispatcher, RecordingDispatcher, TestCatalog};
use opencatalog_storage::Store;

#[test]
fn disabling_multilang_clears_channel_locales() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    catalog.enable_multilang(&["en_US", "de_DE"])?;
    let web = catalog.add_channel("Web", &["en_US", "de_DE"])?;
    let print = catalog.add_channel("Print", &["de_DE"])?;
    catalog.add_channel("Bare", &[])?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update = SettingsUpdate::default().set(K_IS_MULTILANG_ACTIVE, serde_json::json!(false));

    let mut dispatcher = RecordingDispatcher::default();
    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut dispatcher, context, update)?;

    assert_eq!(outcome.pruned_channels, 2);
    assert!(outcome.dispatched.is_none());
    assert!(catalog.store.get_channel(web)?.unwrap().locales.is_empty());
    assert!(catalog.store.get_channel(print)?.unwrap().locales.is_empty());
    Ok(())
}

#[test]
fn stale_channel_locales_are_cleared_even_when_multilang_was_off(
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    // Multilang is off, but a channel still carries leftover locales.
    let web = catalog.add_channel("Web", &["en_US", "de_DE"])?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update = SettingsUpdate::default().set(K_IS_MULTILANG_ACTIVE, serde_json::json!(false));

    let mut dispatcher = RecordingDispatcher::default();
    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut dispatcher, context, update)?;

    assert_eq!(outcome.pruned_channels, 1);
    assert!(catalog.store.get_channel(web)?.unwrap().locales.is_empty());
    Ok(())
}

#[test]
fn removed_locale_is_pruned_from_channels() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    catalog.enable_multilang(&["en_US", "de_DE"])?;
    let web = catalog.add_channel("Web", &["en_US", "de_DE"])?;
    let print = catalog.add_channel("Print", &["en_US"])?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update =
        SettingsUpdate::default().set(K_INPUT_LANGUAGE_LIST, serde_json::json!(["en_US"]));

    let mut dispatcher = RecordingDispatcher::default();
    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut dispatcher, context, update)?;

    assert_eq!(outcome.pruned_channels, 1);
    assert_eq!(
        catalog.store.get_channel(web)?.unwrap().locales,
        vec![Locale::parse("en_US")?]
    );
    assert_eq!(
        catalog.store.get_channel(print)?.unwrap().locales,
        vec![Locale::parse("en_US")?]
    );
    Ok(())
}

#[test]
fn enabling_multilang_does_not_prune_against_stale_list(
) -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;
    // A previous enable left a wider language list behind; multilang is off.
    catalog
        .config
        .set(K_INPUT_LANGUAGE_LIST, serde_json::json!(["en_US", "de_DE"]));
    let web = catalog.add_channel("Web", &["en_US", "de_DE"])?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update = SettingsUpdate::default()
        .set(K_IS_MULTILANG_ACTIVE, serde_json::json!(true))
        .set(K_INPUT_LANGUAGE_LIST, serde_json::json!(["en_US"]));

    let mut dispatcher = RecordingDispatcher::default();
    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut dispatcher, context, update)?;

    // The old list was never live, so nothing counts as removed.
    assert_eq!(outcome.pruned_channels, 0);
    assert_eq!(
        catalog.store.get_channel(web)?.unwrap().locales,
        vec![Locale::parse("en_US")?, Locale::parse("de_DE")?]
    );
    Ok(())
}

#[test]
fn ownership_change_dispatches_one_job() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update = SettingsUpdate::default()
        .set(K_TEAMS_ATTRIBUTE_OWNERSHIP, serde_json::json!("fromProduct"))
        .set(
            K_OWNER_USER_ATTRIBUTE_OWNERSHIP,
            serde_json::json!("fromAttribute"),
        )
        .set(K_TEAMS_PRODUCT_OWNERSHIP, serde_json::json!("fromProduct"));

    let mut dispatcher = RecordingDispatcher::default();
    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut dispatcher, context, update)?;

    assert!(outcome.dispatched.is_some());
    assert_eq!(dispatcher.calls.len(), 1);

    let job = &dispatcher.calls[0];
    assert_eq!(job.job_type, JobType::OwnershipRecompute);
    assert_eq!(job.priority, NORMAL_PRIORITY);
    assert_eq!(job.description, "Updating ownership information");

    // Both halves of the policy travel in the payload.
    assert_eq!(job.payload["attribute"]["teams"], "fromProduct");
    assert_eq!(job.payload["attribute"]["ownerUser"], "fromAttribute");
    assert_eq!(job.payload["product"]["teams"], "fromProduct");
    assert_eq!(job.payload["product"]["assignedUser"], "notInherit");
    Ok(())
}

#[test]
fn all_not_inherit_dispatches_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update = SettingsUpdate::default()
        .set(K_TEAMS_ATTRIBUTE_OWNERSHIP, serde_json::json!("notInherit"))
        .set(K_TEAMS_PRODUCT_OWNERSHIP, serde_json::json!("notInherit"));

    let mut dispatcher = RecordingDispatcher::default();
    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut dispatcher, context, update)?;

    assert!(outcome.dispatched.is_none());
    assert!(dispatcher.calls.is_empty());
    Ok(())
}

#[test]
fn queue_dispatcher_persists_the_job() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update =
        SettingsUpdate::default().set(K_TEAMS_ATTRIBUTE_OWNERSHIP, serde_json::json!("fromProduct"));

    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut QueueDispatcher, context, update)?;

    let jobs = catalog.store.list_jobs()?;
    assert_eq!(jobs.len(), 1);
    assert_eq!(Some(jobs[0].id), outcome.dispatched);
    assert_eq!(jobs[0].job_type, "ownershipRecompute");
    assert_eq!(jobs[0].priority, NORMAL_PRIORITY);
    Ok(())
}

#[test]
fn override_markers_are_consumed_and_config_saved() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update = SettingsUpdate::default()
        .set(K_TEAMS_ATTRIBUTE_OWNERSHIP, serde_json::json!("fromProduct"))
        .set("overrideAttributeTeams", serde_json::json!(true));

    let mut dispatcher = RecordingDispatcher::default();
    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    reconciler.reconcile(&mut dispatcher, context, update)?;

    assert!(!catalog.config.has("overrideAttributeTeams"));

    // The persisted config matches: reload from the store.
    let reloaded = Config::load(&catalog.store)?;
    assert!(!reloaded.has("overrideAttributeTeams"));
    assert_eq!(
        reloaded
            .get(K_TEAMS_ATTRIBUTE_OWNERSHIP)
            .and_then(|v| v.as_str()),
        Some("fromProduct")
    );
    Ok(())
}

#[test]
fn dispatch_failure_is_reported_not_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let mut catalog = TestCatalog::new()?;

    let context = ReconcileContext::capture(&catalog.config)?;
    let update =
        SettingsUpdate::default().set(K_TEAMS_ATTRIBUTE_OWNERSHIP, serde_json::json!("fromProduct"));

    let mut reconciler = PolicyChangeReconciler::new(
        &mut catalog.store,
        &mut catalog.config,
        &catalog.language,
    );
    let outcome = reconciler.reconcile(&mut FailingDispatcher, context, update)?;

    assert!(outcome.dispatched.is_none());
    assert!(outcome
        .dispatch_error
        .as_deref()
        .is_some_and(|e| e.contains("queue unavailable")));

    // The settings themselves were still applied and saved.
    let reloaded = Config::load(&catalog.store)?;
    assert_eq!(
        reloaded
            .get(K_TEAMS_ATTRIBUTE_OWNERSHIP)
            .and_then(|v| v.as_str()),
        Some("fromProduct")
    );
    Ok(())
}

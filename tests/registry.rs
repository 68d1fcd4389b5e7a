use tempfile::TempDir;

use oss_manager::message::MessageRenderer;
use oss_manager::notifier::drain;
use oss_manager::store::{PendingBundle, Project, Registry, RegistryError};

const BUSY_TIMEOUT_MS: u64 = 1_000;

fn open(temp_dir: &TempDir) -> Registry {
    let db_path = temp_dir.path().join("test.db");
    Registry::new(&db_path, BUSY_TIMEOUT_MS).unwrap()
}

fn register_three(registry: &Registry) {
    registry
        .register_project("Project One", "https://one.example.com")
        .unwrap();
    registry
        .register_project("Project Two", "https://two.example.com")
        .unwrap();
    registry
        .register_project("Project Three", "https://three.example.com")
        .unwrap();
}

#[test]
fn projects_versions_and_pending_updates() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open(&temp_dir);
    register_three(&registry);

    registry
        .record_version_update("Project One", "1.0.1-a")
        .unwrap();
    registry.record_version_update("Project One", "2.0.0").unwrap();
    registry.record_version_update("Project Two", "3.0.0").unwrap();
    assert!(matches!(
        registry.record_version_update("Project-One", "1.0.1-a"),
        Err(RegistryError::ProjectNotFound(_))
    ));
    assert!(matches!(
        registry.record_version_update("Project One", "1-0-1-a"),
        Err(RegistryError::BadVersion(_))
    ));

    assert_eq!(
        registry.list_projects().unwrap(),
        vec![
            Project::new("Project One", "https://one.example.com")
                .with_versions(["1.0.1-a", "2.0.0"]),
            Project::new("Project Three", "https://three.example.com"),
            Project::new("Project Two", "https://two.example.com").with_versions(["3.0.0"]),
        ]
    );

    let expected_updates = vec![
        PendingBundle::new("Project One", "https://one.example.com")
            .with_versions(["1.0.1-a", "2.0.0"]),
        PendingBundle::new("Project Two", "https://two.example.com").with_versions(["3.0.0"]),
    ];
    for expected in expected_updates {
        let actual = registry.peek_next_update().unwrap();
        assert_eq!(actual, expected);

        registry.acknowledge_updates(&actual.name).unwrap();
    }

    // Should be empty
    assert!(matches!(
        registry.peek_next_update(),
        Err(RegistryError::ProjectNotFound(None))
    ));
    assert!(matches!(
        registry.acknowledge_updates(""),
        Err(RegistryError::IncompatibleQueueState(_))
    ));
}

#[test]
fn same_major_keeps_latest_minor_but_queues_every_notice() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open(&temp_dir);
    registry.register_project("P", "u").unwrap();

    registry.record_version_update("P", "1.0.1-a").unwrap();
    registry.record_version_update("P", "1.0.5").unwrap();

    assert_eq!(
        registry.list_projects().unwrap(),
        vec![Project::new("P", "u").with_versions(["1.0.5"])]
    );
    assert_eq!(
        registry.peek_next_update().unwrap().versions,
        vec!["1.0.1-a", "1.0.5"]
    );
}

#[test]
fn re_registering_replaces_url_and_keeps_history() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open(&temp_dir);
    registry.register_project("P", "https://old.example.com").unwrap();
    registry.record_version_update("P", "2.0.0").unwrap();

    registry.register_project("P", "https://new.example.com").unwrap();

    assert_eq!(
        registry.list_projects().unwrap(),
        vec![Project::new("P", "https://new.example.com").with_versions(["2.0.0"])]
    );
    assert_eq!(
        registry.peek_next_update().unwrap().url,
        "https://new.example.com"
    );
}

#[test]
fn peek_returns_only_project_with_pending_updates() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open(&temp_dir);
    registry.register_project("Alpha", "https://alpha.example.com").unwrap();
    registry.register_project("Beta", "https://beta.example.com").unwrap();

    registry.record_version_update("Beta", "3.0.0").unwrap();

    assert_eq!(
        registry.peek_next_update().unwrap(),
        PendingBundle::new("Beta", "https://beta.example.com").with_versions(["3.0.0"])
    );
}

#[test]
fn drain_renders_each_project_once() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open(&temp_dir);
    register_three(&registry);
    registry.record_version_update("Project Two", "3.0.0").unwrap();
    registry
        .record_version_update("Project One", "1.0.1-a")
        .unwrap();
    registry.record_version_update("Project One", "2.0.0").unwrap();
    let renderer = MessageRenderer::new().unwrap();

    let mut messages = Vec::new();
    let delivered = drain(&registry, |bundle| {
        messages.push(renderer.for_update(bundle)?);
        Ok(())
    })
    .unwrap();

    assert_eq!(delivered, 2);
    assert_eq!(
        messages,
        vec![
            "Updates for Project One are available:\n\n  - 1.0.1-a\n  - 2.0.0\n\n https://one.example.com\n",
            "An update for Project Two is available:\n\n  - 3.0.0\n\n https://two.example.com\n",
        ]
    );
    assert!(registry.peek_next_update().unwrap_err().is_not_found());
}

#[test]
fn failed_delivery_leaves_notice_queued() {
    let temp_dir = TempDir::new().unwrap();
    let registry = open(&temp_dir);
    registry.register_project("P", "u").unwrap();
    registry.record_version_update("P", "1.0").unwrap();

    assert!(drain(&registry, |_| anyhow::bail!("notifier offline")).is_err());

    assert_eq!(registry.peek_next_update().unwrap().versions, vec!["1.0"]);
}

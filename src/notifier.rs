//! Draining the pending update queue

use anyhow::Context;
#[cfg(test)]
use mockall::automock;
use tracing::{info, warn};

use crate::store::error::RegistryError;
use crate::store::registry::Registry;
use crate::store::types::PendingBundle;

/// Read side of the pending update queue
#[cfg_attr(test, automock)]
pub trait PendingUpdates {
    /// First project with undelivered versions; `ProjectNotFound` when empty
    fn peek_next_update(&self) -> Result<PendingBundle, RegistryError>;

    /// Drop every pending version for the project
    fn acknowledge_updates(&self, name: &str) -> Result<(), RegistryError>;
}

impl PendingUpdates for Registry {
    fn peek_next_update(&self) -> Result<PendingBundle, RegistryError> {
        Registry::peek_next_update(self)
    }

    fn acknowledge_updates(&self, name: &str) -> Result<(), RegistryError> {
        Registry::acknowledge_updates(self, name)
    }
}

/// Hand every pending bundle to `deliver`, acknowledging each one after it
/// was delivered. Returns the number of projects delivered.
///
/// A failed delivery stops the loop and leaves that bundle queued.
pub fn drain<P, F>(source: &P, mut deliver: F) -> anyhow::Result<usize>
where
    P: PendingUpdates + ?Sized,
    F: FnMut(&PendingBundle) -> anyhow::Result<()>,
{
    let mut delivered = 0;

    loop {
        let bundle = match source.peek_next_update() {
            Ok(bundle) => bundle,
            Err(e) if e.is_not_found() => break,
            Err(e) => return Err(e).context("Failed to read pending updates"),
        };

        if let Err(e) = deliver(&bundle) {
            warn!("Delivery failed for {}, keeping it queued: {:#}", bundle.name, e);
            return Err(e.context(format!("Failed to deliver updates for {}", bundle.name)));
        }

        source
            .acknowledge_updates(&bundle.name)
            .with_context(|| format!("Failed to acknowledge updates for {}", bundle.name))?;

        info!(
            "Delivered {} update(s) for {}",
            bundle.versions.len(),
            bundle.name
        );
        delivered += 1;
    }

    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    fn bundle(name: &str, versions: &[&str]) -> PendingBundle {
        PendingBundle::new(name, format!("https://{name}.example.com"))
            .with_versions(versions.iter().copied())
    }

    #[test]
    fn drain_delivers_and_acknowledges_until_empty() {
        let mut source = MockPendingUpdates::new();
        let mut seq = Sequence::new();

        source
            .expect_peek_next_update()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(bundle("alpha", &["1.0.1-a", "2.0.0"])));
        source
            .expect_acknowledge_updates()
            .withf(|name| name == "alpha")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        source
            .expect_peek_next_update()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(bundle("beta", &["3.0.0"])));
        source
            .expect_acknowledge_updates()
            .withf(|name| name == "beta")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        source
            .expect_peek_next_update()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Err(RegistryError::ProjectNotFound(None)));

        let mut seen = Vec::new();
        let delivered = drain(&source, |b| {
            seen.push(b.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(
            seen,
            vec![bundle("alpha", &["1.0.1-a", "2.0.0"]), bundle("beta", &["3.0.0"])]
        );
    }

    #[test]
    fn drain_on_empty_queue_delivers_nothing() {
        let mut source = MockPendingUpdates::new();
        source
            .expect_peek_next_update()
            .times(1)
            .returning(|| Err(RegistryError::ProjectNotFound(None)));
        source.expect_acknowledge_updates().never();

        let delivered = drain(&source, |_| panic!("nothing to deliver")).unwrap();

        assert_eq!(delivered, 0);
    }

    #[test]
    fn drain_keeps_bundle_queued_when_delivery_fails() {
        let mut source = MockPendingUpdates::new();
        source
            .expect_peek_next_update()
            .times(1)
            .returning(|| Ok(bundle("alpha", &["1.0"])));
        source.expect_acknowledge_updates().never();

        let err = drain(&source, |_| Err(anyhow::anyhow!("smtp down"))).unwrap_err();

        assert!(err.to_string().contains("alpha"));
    }

    #[test]
    fn drain_propagates_storage_errors() {
        let mut source = MockPendingUpdates::new();
        source
            .expect_peek_next_update()
            .times(1)
            .returning(|| Err(RegistryError::LockPoisoned));

        let err = drain(&source, |_| Ok(())).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<RegistryError>(),
            Some(RegistryError::LockPoisoned)
        ));
    }
}

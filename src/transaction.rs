//! Transactional scopes.
//!
//! [`run_in_transaction`] opens a scope on an executor, runs a block and
//! closes the scope: commit when the block returns `Ok`, rollback when it
//! returns `Err`. Scopes nest; an inner scope maps to a savepoint on
//! PostgreSQL and to a snapshot on the in-memory executor.

use crate::executor::{LifeError, LifeExecutor};

/// Run `block` inside a transaction on `executor`
///
/// Only persisted state is rolled back; in-memory changes the block made to
/// records stay in place.
///
/// # Example
///
/// ```rust
/// use lifeguard_assoc::{run_in_transaction, LifeError, MemoryExecutor};
///
/// let executor = MemoryExecutor::new();
/// let result: Result<u32, LifeError> = run_in_transaction(&executor, |_exec| Ok(42));
/// assert_eq!(result.unwrap(), 42);
/// ```
pub fn run_in_transaction<Ex, F, R, E>(executor: &Ex, block: F) -> Result<R, E>
where
    Ex: LifeExecutor + ?Sized,
    F: FnOnce(&Ex) -> Result<R, E>,
    E: From<LifeError>,
{
    executor.begin()?;
    match block(executor) {
        Ok(value) => {
            executor.commit()?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = executor.rollback() {
                log::error!("Rollback failed: {}", rollback_err);
            } else {
                log::warn!("Transaction rolled back");
            }
            Err(err)
        }
    }
}

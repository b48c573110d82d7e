//! Lazily loaded data for external solvers.

use log::info;
use rscolumn_core::errors::ColumnResult;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// An immutable data set (e.g. absorption tables) loaded on first use
///
/// The loader runs at most once, the first time [`SolverData::get`] is called,
/// never when the handle is created. A failed load is remembered and returned to
/// every later caller. Share the handle between solvers with an [`Arc`].
pub struct SolverData<T> {
    name: &'static str,
    loader: fn() -> ColumnResult<T>,
    cell: OnceLock<ColumnResult<Arc<T>>>,
}

impl<T> SolverData<T> {
    pub const fn new(name: &'static str, loader: fn() -> ColumnResult<T>) -> Self {
        Self {
            name,
            loader,
            cell: OnceLock::new(),
        }
    }

    /// The loaded data, loading it if needed
    pub fn get(&self) -> ColumnResult<Arc<T>> {
        self.cell
            .get_or_init(|| {
                info!("Loading solver data '{}'", self.name);
                (self.loader)().map(Arc::new)
            })
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn name(&self) -> &str {
        self.name
    }
}

impl<T> fmt::Debug for SolverData<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverData")
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rscolumn_core::errors::ColumnError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static LOADS: AtomicUsize = AtomicUsize::new(0);

    fn load_table() -> ColumnResult<Vec<f64>> {
        LOADS.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, 2.0, 3.0])
    }

    fn load_missing() -> ColumnResult<Vec<f64>> {
        Err(ColumnError::ExternalSolverFailure {
            solver: "test".to_string(),
            reason: "table not found".to_string(),
        })
    }

    #[test]
    fn loads_once_on_first_use() {
        let data = Arc::new(SolverData::new("abs_ems", load_table));
        assert!(!data.is_loaded());
        assert_eq!(LOADS.load(Ordering::SeqCst), 0);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let data = data.clone();
                std::thread::spawn(move || data.get().unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(*handle.join().unwrap(), vec![1.0, 2.0, 3.0]);
        }

        assert!(data.is_loaded());
        assert_eq!(LOADS.load(Ordering::SeqCst), 1);
        assert!(format!("{:?}", data).contains("loaded: true"));
    }

    #[test]
    fn failure_is_remembered() {
        let data = SolverData::new("missing", load_missing);
        assert!(data.get().is_err());
        assert!(data.is_loaded());
        assert_eq!(data.get().unwrap_err(), load_missing().unwrap_err());
    }
}

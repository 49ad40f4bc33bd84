//! Non-owning references between components.

use montage_types::PortError;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// A non-owning reference to a component, seen through interface `I`.
///
/// Handles are what connectors hand to user ports. The assembly owns every
/// instance; a handle only points at one. Once the assembly is dropped, every
/// access through the handle returns [`PortError::Dangling`].
pub struct Handle<I: ?Sized> {
    target: Weak<RefCell<I>>,
    name: Rc<str>,
}

impl<I: ?Sized> Handle<I> {
    /// Create a handle pointing at `target`.
    pub fn new(name: &str, target: &Rc<RefCell<I>>) -> Self {
        Self {
            target: Rc::downgrade(target),
            name: Rc::from(name),
        }
    }

    /// Qualified name of the target component.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True while the owning assembly is alive.
    pub fn is_alive(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Run `f` with shared access to the target.
    pub fn with<R>(&self, f: impl FnOnce(&I) -> R) -> Result<R, PortError> {
        let target = self.upgrade()?;
        let guard = target.try_borrow().map_err(|_| self.busy())?;
        Ok(f(&guard))
    }

    /// Run `f` with exclusive access to the target.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut I) -> R) -> Result<R, PortError> {
        let target = self.upgrade()?;
        let mut guard: RefMut<'_, I> = target.try_borrow_mut().map_err(|_| self.busy())?;
        Ok(f(&mut guard))
    }

    /// True when both handles point at the same instance.
    pub fn ptr_eq(&self, other: &Handle<I>) -> bool {
        Weak::ptr_eq(&self.target, &other.target)
    }

    fn upgrade(&self) -> Result<Rc<RefCell<I>>, PortError> {
        self.target.upgrade().ok_or_else(|| PortError::Dangling {
            component: self.name.to_string(),
        })
    }

    fn busy(&self) -> PortError {
        PortError::Busy {
            component: self.name.to_string(),
        }
    }
}

impl<I: ?Sized> Clone for Handle<I> {
    fn clone(&self) -> Self {
        Self {
            target: Weak::clone(&self.target),
            name: Rc::clone(&self.name),
        }
    }
}

impl<I: ?Sized> fmt::Debug for Handle<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("target", &self.name)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named {
        fn name(&self) -> String;
    }

    struct Thing(&'static str);

    impl Named for Thing {
        fn name(&self) -> String {
            self.0.to_owned()
        }
    }

    #[test]
    fn handle_reads_through_interface() {
        let owner: Rc<RefCell<dyn Named>> = Rc::new(RefCell::new(Thing("a")));
        let handle = Handle::new("a", &owner);
        assert_eq!(handle.with(|t| t.name()).unwrap(), "a");
        assert!(handle.is_alive());
    }

    #[test]
    fn handle_dangles_after_owner_drops() {
        let owner = Rc::new(RefCell::new(Thing("b")));
        let handle = Handle::new("b", &owner);
        drop(owner);
        let err = handle.with(|t| t.0).unwrap_err();
        assert!(matches!(err, PortError::Dangling { .. }));
        assert!(!handle.is_alive());
    }

    #[test]
    fn handle_reports_conflicting_borrow() {
        let owner = Rc::new(RefCell::new(Thing("c")));
        let handle = Handle::new("c", &owner);
        let _guard = owner.borrow();
        let err = handle.with_mut(|t| t.0 = "d").unwrap_err();
        assert!(matches!(err, PortError::Busy { .. }));
    }
}

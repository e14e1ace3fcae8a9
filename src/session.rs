use std::rc::Rc;

use crate::store::{KeyValueStore, SESSION_KEY, StoreError};

/// Presence flag gating everything except `login`.
///
/// This is not authentication: whoever can read the store can set the flag.
pub struct Session {
    store: Rc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn is_active(&self) -> Result<bool, StoreError> {
        Ok(self.store.get(SESSION_KEY)?.is_some())
    }

    pub fn login(&self) -> Result<(), StoreError> {
        self.store.set(SESSION_KEY, "true")?;
        log::info!("event=session_login");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), StoreError> {
        self.store.remove(SESSION_KEY)?;
        log::info!("event=session_logout");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn login_and_logout_toggle_the_flag() {
        let session = Session::new(Rc::new(MemoryStore::new()));
        assert!(!session.is_active().unwrap());
        session.login().unwrap();
        assert!(session.is_active().unwrap());
        session.logout().unwrap();
        assert!(!session.is_active().unwrap());
    }
}

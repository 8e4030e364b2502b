//! Wallet session context.
//!
//! Tracks which account is connected and gates every write action on an
//! active session. Disconnecting drops the account but deliberately leaves
//! workflow progress alone.

use alloy_primitives::Address;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionContext {
    account: Option<Address>,
    connected: bool,
}

impl SessionContext {
    pub fn connect(&mut self, account: Address) {
        self.account = Some(account);
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        self.account = None;
        self.connected = false;
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// An action needs both a live session and a bound account.
    pub fn can_act(&self) -> bool {
        self.connected && self.account.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn disconnect_clears_account() {
        let mut session = SessionContext::default();
        assert!(!session.can_act());

        session.connect(address!("abcd000000000000000000000000000000001234"));
        assert!(session.can_act());

        session.disconnect();
        assert!(!session.can_act());
        assert!(session.account().is_none());
    }
}

//! Per-resource revision tokens
//!
//! Every fetch is stamped with a token from [`Revision::issue`]. A completed
//! fetch is applied only when its token is newer than the last applied one,
//! so a slow response can never overwrite data from a request issued after
//! it.

use crate::error::WalletError;

#[derive(Debug)]
pub struct Revision {
    resource: &'static str,
    issued: u64,
    applied: u64,
}

impl Revision {
    pub fn new(resource: &'static str) -> Self {
        Self {
            resource,
            issued: 0,
            applied: 0,
        }
    }

    /// Stamp a new outgoing fetch
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Claim the slot for a completed fetch
    pub fn accept(&mut self, token: u64) -> Result<(), WalletError> {
        if token <= self.applied {
            return Err(WalletError::StaleResponse {
                resource: self.resource,
                token,
                applied: self.applied,
            });
        }
        self.applied = token;
        Ok(())
    }

    /// Mark every fetch issued so far as stale
    pub fn invalidate(&mut self) {
        self.applied = self.issued;
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_order_completions_apply() {
        let mut rev = Revision::new("chain");
        let a = rev.issue();
        let b = rev.issue();
        assert!(rev.accept(a).is_ok());
        assert!(rev.accept(b).is_ok());
        assert_eq!(rev.applied(), b);
    }

    #[test]
    fn test_late_older_completion_is_stale() {
        let mut rev = Revision::new("balance");
        let older = rev.issue();
        let newer = rev.issue();

        assert!(rev.accept(newer).is_ok());
        match rev.accept(older) {
            Err(WalletError::StaleResponse {
                resource,
                token,
                applied,
            }) => {
                assert_eq!(resource, "balance");
                assert_eq!(token, older);
                assert_eq!(applied, newer);
            }
            other => panic!("expected StaleResponse, got {:?}", other),
        }
        assert_eq!(rev.applied(), newer);
    }

    #[test]
    fn test_shuffled_completions_keep_newest() {
        let mut rev = Revision::new("chain");
        let tokens: Vec<u64> = (0..6).map(|_| rev.issue()).collect();

        // completion order: 2, 0, 5, 1, 3, 4
        let mut shown = None;
        for idx in [2usize, 0, 5, 1, 3, 4] {
            if rev.accept(tokens[idx]).is_ok() {
                shown = Some(tokens[idx]);
            }
        }
        assert_eq!(shown, Some(tokens[5]));
    }

    #[test]
    fn test_invalidate_drops_in_flight() {
        let mut rev = Revision::new("balance");
        let in_flight = rev.issue();
        rev.invalidate();
        assert!(rev.accept(in_flight).is_err());

        let fresh = rev.issue();
        assert!(rev.accept(fresh).is_ok());
    }
}

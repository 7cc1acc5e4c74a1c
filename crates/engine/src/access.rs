//! Caller identity and the permission check run before every command.

/// Who sent a command, as reported by the chat transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Caller {
    pub user_id: u64,
    pub chat_id: i64,
}

impl Caller {
    pub fn new(user_id: u64, chat_id: i64) -> Self {
        Self { user_id, chat_id }
    }
}

/// Decides whether a caller may use the ledger at all.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, caller: &Caller) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&Caller) -> bool + Send + Sync,
{
    fn is_authorized(&self, caller: &Caller) -> bool {
        self(caller)
    }
}

/// Static allow list of users and chats.
///
/// With neither list set everyone is allowed. Otherwise a caller passes when
/// its user id or the chat it writes from is listed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList {
    users: Option<Vec<u64>>,
    chats: Option<Vec<i64>>,
}

impl AllowList {
    pub fn open() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn users(mut self, users: Vec<u64>) -> Self {
        if !users.is_empty() {
            self.users = Some(users);
        }
        self
    }

    #[must_use]
    pub fn chats(mut self, chats: Vec<i64>) -> Self {
        if !chats.is_empty() {
            self.chats = Some(chats);
        }
        self
    }
}

impl Authorizer for AllowList {
    fn is_authorized(&self, caller: &Caller) -> bool {
        match (&self.users, &self.chats) {
            (None, None) => true,
            (users, chats) => {
                users.as_ref().is_some_and(|ids| ids.contains(&caller.user_id))
                    || chats.as_ref().is_some_and(|ids| ids.contains(&caller.chat_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_list_allows_everyone() {
        assert!(AllowList::open().is_authorized(&Caller::new(1, -100)));
        assert!(AllowList::open().users(vec![]).is_authorized(&Caller::new(1, -100)));
    }

    #[test]
    fn listed_user_or_chat_is_enough() {
        let list = AllowList::open().users(vec![7]).chats(vec![-42]);
        assert!(list.is_authorized(&Caller::new(7, 1)));
        assert!(list.is_authorized(&Caller::new(8, -42)));
        assert!(!list.is_authorized(&Caller::new(8, 1)));
    }
}

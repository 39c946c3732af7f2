//! WhatsApp JID classification.
//!
//! The inbox shows individual and group chats only; status broadcasts and
//! newsletter channels are filtered out, and the backend refuses message
//! fetches for them.

pub const INDIVIDUAL_SUFFIX: &str = "@s.whatsapp.net";
pub const GROUP_SUFFIX: &str = "@g.us";
pub const STATUS_BROADCAST: &str = "status@broadcast";
pub const NEWSLETTER_MARKER: &str = "@newsletter";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JidKind {
    Individual,
    Group,
    StatusBroadcast,
    Newsletter,
    Other,
}

pub fn classify(jid: &str) -> JidKind {
    if jid == STATUS_BROADCAST {
        JidKind::StatusBroadcast
    } else if jid.ends_with(NEWSLETTER_MARKER) {
        JidKind::Newsletter
    } else if jid.ends_with(INDIVIDUAL_SUFFIX) {
        JidKind::Individual
    } else if jid.ends_with(GROUP_SUFFIX) {
        JidKind::Group
    } else {
        JidKind::Other
    }
}

/// True for the JID kinds that belong in the inbox.
pub fn is_chat(jid: &str) -> bool {
    matches!(classify(jid), JidKind::Individual | JidKind::Group)
}

/// True for JIDs the backend will not serve messages for.
pub fn is_message_blocked(jid: &str) -> bool {
    matches!(
        classify(jid),
        JidKind::StatusBroadcast | JidKind::Newsletter
    )
}

/// The part before the first `@`; for individual chats this is the phone
/// number in international format without the plus.
pub fn phone_part(jid: &str) -> &str {
    jid.split('@').next().unwrap_or(jid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn individual_and_group_jids_are_chats() {
        assert!(is_chat("6289685028129@s.whatsapp.net"));
        assert!(is_chat("1203630249817@g.us"));
    }

    #[test]
    fn broadcast_and_newsletter_jids_are_not_chats() {
        assert!(!is_chat("status@broadcast"));
        assert!(!is_chat("120363167@newsletter"));
    }

    #[test]
    fn unknown_suffixes_are_not_chats() {
        assert!(!is_chat("weird@lid"));
        assert!(!is_chat("no-at-sign"));
    }

    #[test]
    fn message_fetch_is_blocked_for_broadcast_and_newsletter_only() {
        assert!(is_message_blocked("status@broadcast"));
        assert!(is_message_blocked("120363167@newsletter"));
        assert!(!is_message_blocked("6289685028129@s.whatsapp.net"));
        assert!(!is_message_blocked("1203630249817@g.us"));
        assert!(!is_message_blocked("weird@lid"));
    }

    #[test]
    fn phone_part_is_everything_before_the_first_at() {
        assert_eq!(phone_part("6289685028129@s.whatsapp.net"), "6289685028129");
        assert_eq!(phone_part("1203630249817@g.us"), "1203630249817");
        assert_eq!(phone_part("no-at-sign"), "no-at-sign");
    }

    #[test]
    fn classification_is_exhaustive_over_known_shapes() {
        assert_eq!(classify("6289685028129@s.whatsapp.net"), JidKind::Individual);
        assert_eq!(classify("1203630249817@g.us"), JidKind::Group);
        assert_eq!(classify("status@broadcast"), JidKind::StatusBroadcast);
        assert_eq!(classify("120363167@newsletter"), JidKind::Newsletter);
        assert_eq!(classify("weird@lid"), JidKind::Other);
    }
}

//! Contact matcher
//!
//! Exact `osc_path` equality wins over the `/<id>` suffix rule across the
//! whole table; within each rule the first contact in table order wins.

use std::sync::Arc;

use contracts::Contact;

/// Resolve the contact for `address`, if any
pub fn match_contact<'a>(address: &str, contacts: &'a [Arc<Contact>]) -> Option<&'a Arc<Contact>> {
    contacts
        .iter()
        .find(|contact| contact.exact_path() == Some(address))
        .or_else(|| contacts.iter().find(|contact| has_id_suffix(address, &contact.id)))
}

fn has_id_suffix(address: &str, id: &str) -> bool {
    address
        .strip_suffix(id)
        .is_some_and(|rest| rest.ends_with('/'))
}

//! Company/contact relationship selector
//!
//! Selecting a company triggers a targeted gateway query for its
//! contacts. Selections can be superseded while a load is in flight;
//! each load takes a generation token when it starts and discards its
//! result if a newer selection has bumped the token since. The cache
//! therefore always shows the contacts of the most recent selection,
//! regardless of response ordering.

use std::sync::atomic::Ordering;

use crate::core::Result;
use crate::entities::{Company, Contact};
use crate::store::{decode_records, CancelFlag, CrmStore};

impl CrmStore {
    /// Select a company (or clear the selection with `None`) and load
    /// its related contacts.
    pub fn select_company(&self, company_id: Option<&str>, cancel: &CancelFlag) -> Result<()> {
        {
            let mut state = self.state.write().unwrap();
            state.selected_company = company_id.map(str::to_string);
            state.related_contacts.clear();
            state.related_loading = company_id.is_some();
        }
        match company_id {
            Some(id) => self.load_related_contacts(id, cancel),
            None => {
                // Clearing still invalidates any in-flight load
                self.related_generation.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    pub fn select_contact(&self, contact_id: Option<&str>) {
        let mut state = self.state.write().unwrap();
        state.selected_contact = contact_id.map(str::to_string);
    }

    pub fn selected_company(&self) -> Option<String> {
        self.state.read().unwrap().selected_company.clone()
    }

    pub fn selected_contact(&self) -> Option<String> {
        self.state.read().unwrap().selected_contact.clone()
    }

    /// Contacts of the currently selected company, as of the last
    /// completed load
    pub fn related_contacts(&self) -> Vec<Contact> {
        self.state.read().unwrap().related_contacts.clone()
    }

    pub fn related_loading(&self) -> bool {
        self.state.read().unwrap().related_loading
    }

    /// The company a contact belongs to, resolved from the cached
    /// snapshot without a gateway round trip.
    pub fn company_for_contact(&self, contact_id: &str) -> Option<Company> {
        let state = self.state.read().unwrap();
        let contact = state.contacts.get(contact_id)?;
        if let Some(company) = &contact.company {
            return Some(company.clone());
        }
        let company_id = contact.company_id.as_deref()?;
        state.companies.get(company_id).cloned()
    }

    /// Re-run the related-contact load for the current selection
    pub fn refresh_relations(&self, cancel: &CancelFlag) -> Result<()> {
        let selected = self.selected_company();
        match selected {
            Some(id) => self.load_related_contacts(&id, cancel),
            None => Ok(()),
        }
    }

    fn load_related_contacts(&self, company_id: &str, cancel: &CancelFlag) -> Result<()> {
        let generation = self.related_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let wire = self.backend.contacts_by_company(company_id);
        let mut state = self.state.write().unwrap();
        if generation != self.related_generation.load(Ordering::SeqCst) {
            // A newer selection owns the slot now; drop this result
            return Ok(());
        }
        if cancel.is_cancelled() {
            return Ok(());
        }
        state.related_loading = false;
        match wire {
            Ok(records) => {
                let contacts = decode_records::<Contact>(records, &state.refs())?;
                state.related_contacts = contacts;
                Ok(())
            }
            Err(err) => {
                state.related_contacts.clear();
                Err(err)
            }
        }
    }
}

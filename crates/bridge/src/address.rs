//! Translation between storefront addresses and ERP transaction addresses.
//!
//! State and country codes come from lookup tables the caller injects;
//! values the tables do not know are passed through unchanged so the ERP's
//! own validation reports them.

use std::collections::HashMap;
use std::sync::Arc;

use erp_bridge_core::Address;

use crate::erp::RemoteAddress;

/// State name to ERP state code.
pub trait StateCodes: Send + Sync {
    fn by_state_name(&self, name: &str) -> Option<String>;
}

/// ISO country codes to ERP country values and back.
pub trait CountryCodes: Send + Sync {
    /// ERP country value for an ISO 3166 alpha-2 code.
    fn by_iso_country(&self, iso: &str) -> Option<String>;

    /// ISO code for an ERP country value.
    fn to_iso_country(&self, remote: &str) -> Option<String>;
}

/// In-memory lookup tables.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    states: HashMap<String, String>,
    countries: HashMap<String, String>,
    iso_by_country: HashMap<String, String>,
}

impl CodeTable {
    /// Build tables from `(state name, code)` and `(iso, ERP country)` pairs.
    pub fn new<S, C>(states: S, countries: C) -> Self
    where
        S: IntoIterator<Item = (String, String)>,
        C: IntoIterator<Item = (String, String)>,
    {
        let states = states
            .into_iter()
            .map(|(name, code)| (name.to_lowercase(), code))
            .collect();
        let countries: HashMap<String, String> = countries
            .into_iter()
            .map(|(iso, remote)| (iso.to_uppercase(), remote))
            .collect();
        let iso_by_country = countries
            .iter()
            .map(|(iso, remote)| (remote.clone(), iso.clone()))
            .collect();

        Self {
            states,
            countries,
            iso_by_country,
        }
    }
}

impl StateCodes for CodeTable {
    fn by_state_name(&self, name: &str) -> Option<String> {
        self.states.get(&name.to_lowercase()).cloned()
    }
}

impl CountryCodes for CodeTable {
    fn by_iso_country(&self, iso: &str) -> Option<String> {
        self.countries.get(&iso.to_uppercase()).cloned()
    }

    fn to_iso_country(&self, remote: &str) -> Option<String> {
        self.iso_by_country.get(remote).cloned()
    }
}

/// Maps addresses between the storefront and the ERP.
#[derive(Clone)]
pub struct AddressTranslator {
    states: Arc<dyn StateCodes>,
    countries: Arc<dyn CountryCodes>,
}

impl AddressTranslator {
    #[must_use]
    pub fn new(states: Arc<dyn StateCodes>, countries: Arc<dyn CountryCodes>) -> Self {
        Self { states, countries }
    }

    /// Translator backed by a single [`CodeTable`].
    #[must_use]
    pub fn from_table(table: CodeTable) -> Self {
        let table = Arc::new(table);
        Self {
            states: table.clone(),
            countries: table,
        }
    }

    /// Storefront address to ERP address; `None` when there is no address.
    #[must_use]
    pub fn to_remote(&self, address: Option<&Address>) -> Option<RemoteAddress> {
        let address = address?;

        let addressee = [address.firstname.as_deref(), address.lastname.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Some(RemoteAddress {
            addressee: (!addressee.is_empty()).then_some(addressee),
            addr1: address.address1.clone(),
            addr2: address.address2.clone(),
            zip: address.zipcode.clone(),
            city: address.city.clone(),
            state: address.state.as_deref().map(|state| {
                self.states
                    .by_state_name(state)
                    .unwrap_or_else(|| state.to_owned())
            }),
            country: address.country.as_deref().map(|iso| {
                self.countries
                    .by_iso_country(iso)
                    .unwrap_or_else(|| iso.to_owned())
            }),
            phone: address.phone.as_deref().and_then(digits_only),
        })
    }

    /// ERP address to storefront address.
    ///
    /// Returns `None` unless the ERP address has an addressee. The addressee
    /// is split on the first space into first and last name.
    #[must_use]
    pub fn to_storefront(&self, address: Option<&RemoteAddress>) -> Option<Address> {
        let address = address?;
        let addressee = address.addressee.as_deref()?.trim();
        if addressee.is_empty() {
            return None;
        }
        let (firstname, lastname) = match addressee.split_once(' ') {
            Some((first, last)) => (first.to_owned(), Some(last.trim().to_owned())),
            None => (addressee.to_owned(), None),
        };

        Some(Address {
            firstname: Some(firstname),
            lastname,
            address1: address.addr1.clone(),
            address2: address.addr2.clone(),
            zipcode: address.zip.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            country: address.country.as_deref().map(|remote| {
                self.countries
                    .to_iso_country(remote)
                    .unwrap_or_else(|| remote.to_owned())
            }),
            phone: address.phone.clone(),
        })
    }
}

impl std::fmt::Debug for AddressTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressTranslator").finish_non_exhaustive()
    }
}

/// Strip everything but ASCII digits; `None` if nothing is left.
fn digits_only(phone: &str) -> Option<String> {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

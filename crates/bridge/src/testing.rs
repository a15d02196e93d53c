//! In-memory ERP used by the unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use erp_bridge_core::{Address, ExternalId, InternalId, OrderPayload, TransactionId};

use crate::SyncContext;
use crate::address::{AddressTranslator, CodeTable};
use crate::config::BridgeConfig;
use crate::erp::{
    Customer, CustomerGateway, ErpGateways, FulfillmentGateway, FulfillmentQuery, GatewayError,
    InventoryGateway, InventoryItem, Invoice, InvoiceGateway, ItemFulfillment, RemoteAddress,
    RemoteFulfillment, RemoteNotice, RemoteSalesOrder, SalesOrderGateway, SalesOrderUpdate,
    Submission,
};

pub fn translator() -> AddressTranslator {
    AddressTranslator::from_table(CodeTable::new(
        [("New York".to_string(), "NY".to_string())],
        [
            ("US".to_string(), "_unitedStates".to_string()),
            ("CA".to_string(), "_canada".to_string()),
        ],
    ))
}

pub fn context(erp: &MemoryErp) -> SyncContext {
    context_with_config(erp, BridgeConfig::default())
}

pub fn context_with_config(erp: &MemoryErp, config: BridgeConfig) -> SyncContext {
    SyncContext::new(erp.gateways(), config, translator())
}

#[derive(Default)]
struct State {
    next_id: u32,
    orders: Vec<RemoteSalesOrder>,
    order_notices: Option<Vec<RemoteNotice>>,
    order_gets: usize,
    customers: Vec<Customer>,
    customers_created: usize,
    address_updates: usize,
    inventory: HashMap<String, InventoryItem>,
    virtual_items: Vec<InventoryItem>,
    fulfillments: Vec<RemoteFulfillment>,
    fulfillment_notices: Vec<RemoteNotice>,
    fulfillments_created: Vec<ItemFulfillment>,
    searches: Vec<FulfillmentQuery>,
    ignore_search_window: bool,
    invoice_notices: Vec<RemoteNotice>,
    invoices_created: Vec<Invoice>,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> InternalId {
        self.next_id += 1;
        InternalId::new(format!("{prefix}{}", self.next_id))
    }
}

/// A shared in-memory ERP implementing every gateway.
#[derive(Clone, Default)]
pub struct MemoryErp {
    state: Arc<Mutex<State>>,
}

impl MemoryErp {
    /// An ERP stocking `(reference, internal id)` items.
    pub fn with_inventory<const N: usize>(items: [(&str, &str); N]) -> Self {
        let erp = Self::default();
        {
            let mut state = erp.state();
            for (reference, id) in items {
                state.inventory.insert(
                    reference.to_string(),
                    InventoryItem {
                        internal_id: InternalId::new(id),
                        name: Some(reference.to_string()),
                    },
                );
            }
        }
        erp
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn gateways(&self) -> ErpGateways {
        ErpGateways {
            sales_orders: Arc::new(self.clone()),
            customers: Arc::new(self.clone()),
            inventory: Arc::new(self.clone()),
            fulfillments: Arc::new(self.clone()),
            invoices: Arc::new(self.clone()),
        }
    }

    /// Reject every subsequent sales order add with `notices`.
    pub fn reject_orders(&self, notices: Vec<RemoteNotice>) {
        self.state().order_notices = Some(notices);
    }

    /// Attach `notices` to every subsequent fulfillment add.
    pub fn fulfillment_notices(&self, notices: Vec<RemoteNotice>) {
        self.state().fulfillment_notices = notices;
    }

    /// Attach `notices` to every subsequent invoice add.
    pub fn invoice_notices(&self, notices: Vec<RemoteNotice>) {
        self.state().invoice_notices = notices;
    }

    /// Return every stored fulfillment from searches, like a gateway that
    /// does not filter by modification time.
    pub fn ignore_search_window(&self) {
        self.state().ignore_search_window = true;
    }

    pub fn add_order(&self, order: RemoteSalesOrder) {
        self.state().orders.push(order);
    }

    pub fn add_customer(&self, customer: Customer) {
        self.state().customers.push(customer);
    }

    pub fn add_fulfillment(&self, fulfillment: RemoteFulfillment) {
        self.state().fulfillments.push(fulfillment);
    }

    pub fn orders(&self) -> Vec<RemoteSalesOrder> {
        self.state().orders.clone()
    }

    pub fn order_gets(&self) -> usize {
        self.state().order_gets
    }

    pub fn customers_created(&self) -> usize {
        self.state().customers_created
    }

    pub fn address_updates(&self) -> usize {
        self.state().address_updates
    }

    /// Names of the virtual items created, in creation order.
    pub fn virtual_items(&self) -> Vec<String> {
        self.state()
            .virtual_items
            .iter()
            .filter_map(|item| item.name.clone())
            .collect()
    }

    pub fn fulfillments_created(&self) -> Vec<ItemFulfillment> {
        self.state().fulfillments_created.clone()
    }

    pub fn invoices_created(&self) -> Vec<Invoice> {
        self.state().invoices_created.clone()
    }

    pub fn searches(&self) -> Vec<FulfillmentQuery> {
        self.state().searches.clone()
    }
}

fn submit(state: &mut State, notices: Vec<RemoteNotice>, prefix: &str) -> Submission {
    if notices.iter().any(RemoteNotice::is_error) {
        return Submission::rejected(notices);
    }
    Submission {
        internal_id: Some(state.next_id(prefix)),
        notices,
    }
}

#[async_trait]
impl SalesOrderGateway for MemoryErp {
    async fn find_by_external_id(
        &self,
        external_id: &ExternalId,
    ) -> Result<Option<RemoteSalesOrder>, GatewayError> {
        Ok(self
            .state()
            .orders
            .iter()
            .find(|o| o.external_id.as_ref() == Some(external_id))
            .cloned())
    }

    async fn get(&self, internal_id: &InternalId) -> Result<RemoteSalesOrder, GatewayError> {
        let mut state = self.state();
        state.order_gets += 1;
        state
            .orders
            .iter()
            .find(|o| o.internal_id.as_ref() == Some(internal_id))
            .cloned()
            .ok_or_else(|| GatewayError::NotFound {
                record: "Sales order",
                id: internal_id.to_string(),
            })
    }

    async fn add(&self, order: &RemoteSalesOrder) -> Result<Submission, GatewayError> {
        let mut state = self.state();
        if let Some(notices) = state.order_notices.clone() {
            return Ok(Submission::rejected(notices));
        }
        let internal_id = state.next_id("SO-");
        let mut stored = order.clone();
        stored.internal_id = Some(internal_id.clone());
        stored.tran_id = Some(TransactionId::new(format!("SO{}", 1000 + state.next_id)));
        state.orders.push(stored);
        Ok(Submission::accepted(internal_id))
    }

    async fn update(
        &self,
        order: &RemoteSalesOrder,
        fields: &SalesOrderUpdate,
    ) -> Result<Submission, GatewayError> {
        let mut state = self.state();
        let stored = state
            .orders
            .iter_mut()
            .find(|o| o.internal_id.is_some() && o.internal_id == order.internal_id)
            .ok_or_else(|| GatewayError::NotFound {
                record: "Sales order",
                id: format!("{:?}", order.internal_id),
            })?;
        stored.items.clone_from(&fields.items);
        stored.bill_address.clone_from(&fields.bill_address);
        stored.shipping_cost = Some(fields.shipping_cost);
        stored.ship_address.clone_from(&fields.ship_address);
        let internal_id = stored.internal_id.clone();
        Ok(Submission {
            internal_id,
            notices: Vec::new(),
        })
    }
}

#[async_trait]
impl CustomerGateway for MemoryErp {
    async fn find_by_external_id(&self, email: &str) -> Result<Option<Customer>, GatewayError> {
        Ok(self
            .state()
            .customers
            .iter()
            .find(|c| c.external_id.as_str() == email)
            .cloned())
    }

    async fn create(&self, order: &OrderPayload) -> Result<Customer, GatewayError> {
        let mut state = self.state();
        let customer = Customer {
            internal_id: Some(state.next_id("C-")),
            external_id: ExternalId::new(order.email.clone()),
            addresses: order
                .shipping_address
                .as_ref()
                .map(remote_address)
                .into_iter()
                .collect(),
        };
        state.customers_created += 1;
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn update_address(
        &self,
        customer: &Customer,
        address: Option<&Address>,
    ) -> Result<(), GatewayError> {
        let mut state = self.state();
        state.address_updates += 1;
        if let Some(stored) = state
            .customers
            .iter_mut()
            .find(|c| c.external_id == customer.external_id)
        {
            stored.addresses.extend(address.map(remote_address));
        }
        Ok(())
    }
}

fn remote_address(address: &Address) -> RemoteAddress {
    RemoteAddress {
        addr1: address.address1.clone(),
        city: address.city.clone(),
        ..RemoteAddress::default()
    }
}

#[async_trait]
impl InventoryGateway for MemoryErp {
    async fn find_by_item_id(
        &self,
        reference: &str,
    ) -> Result<Option<InventoryItem>, GatewayError> {
        Ok(self.state().inventory.get(reference).cloned())
    }

    async fn find_or_create_virtual(&self, name: &str) -> Result<InventoryItem, GatewayError> {
        let mut state = self.state();
        if let Some(item) = state
            .virtual_items
            .iter()
            .find(|item| item.name.as_deref() == Some(name))
        {
            return Ok(item.clone());
        }
        let item = InventoryItem {
            internal_id: state.next_id("V-"),
            name: Some(name.to_string()),
        };
        state.virtual_items.push(item.clone());
        Ok(item)
    }
}

#[async_trait]
impl FulfillmentGateway for MemoryErp {
    async fn add(&self, fulfillment: &ItemFulfillment) -> Result<Submission, GatewayError> {
        let mut state = self.state();
        let notices = state.fulfillment_notices.clone();
        let submission = submit(&mut state, notices, "IF-");
        if submission.is_accepted() {
            state.fulfillments_created.push(fulfillment.clone());
        }
        Ok(submission)
    }

    async fn search(
        &self,
        query: &FulfillmentQuery,
    ) -> Result<Vec<RemoteFulfillment>, GatewayError> {
        let mut state = self.state();
        state.searches.push(query.clone());
        let ignore_window = state.ignore_search_window;

        // The oldest `page_size` matches, returned in insertion order.
        let mut matching: Vec<(usize, &RemoteFulfillment)> = state
            .fulfillments
            .iter()
            .enumerate()
            .filter(|(_, f)| ignore_window || query.contains(f.last_modified))
            .collect();
        matching.sort_by_key(|(_, f)| f.last_modified);
        matching.truncate(query.page_size);
        matching.sort_by_key(|(index, _)| *index);

        Ok(matching.into_iter().map(|(_, f)| f.clone()).collect())
    }
}

#[async_trait]
impl InvoiceGateway for MemoryErp {
    async fn add(&self, invoice: &Invoice) -> Result<Submission, GatewayError> {
        let mut state = self.state();
        let notices = state.invoice_notices.clone();
        let submission = submit(&mut state, notices, "INV-");
        if submission.is_accepted() {
            state.invoices_created.push(invoice.clone());
        }
        Ok(submission)
    }
}

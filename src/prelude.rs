//! Trolley prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::Cart,
    catalog::{Catalog, CatalogError, Product, ProductKey, ProductSize},
    fixtures::{FixtureError, load_catalog, parse_catalog},
    lines::{Candidate, LineItem, Resolution, line_key, resolve_add},
    money::{Price, PriceError},
    receipt::{
        CustomerDetails, Order, OrderCode, OrderError, PaymentMethod, place_order,
    },
    snapshot::{
        CART_SLOT_KEY, FileSlot, MemorySlot, SlotError, SnapshotSlot, SnapshotStore, decode,
        encode,
    },
    store::{AddOutcome, CartStore},
    sync::{CartSynchronizer, ChangeNotifier, QueueNotifier, SlotChange},
    totals::{Rates, Totals, TotalsError, totals},
};

//! Sample objects exposed by the demonstration host.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rail_dispatch::{Catalog, CatalogError, InvocationError, Invocable, Signature, ValueType};
use tracing::info;

const SAMPLES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::samples");

/// Identifier assigned to the first order a manager creates.
pub const FIRST_ORDER_ID: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Order {
    id: i64,
    client: String,
    quantity: i64,
}

#[derive(Debug)]
struct Book {
    orders: Vec<Order>,
    next_id: i64,
}

/// Keeps a list of client orders.
#[derive(Debug)]
pub struct OrderManager {
    book: Mutex<Book>,
}

impl Default for OrderManager {
    fn default() -> Self {
        Self {
            book: Mutex::new(Book {
                orders: Vec::new(),
                next_id: FIRST_ORDER_ID,
            }),
        }
    }
}

impl OrderManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Book> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records an order and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns an [`InvocationError`] when the client name is blank or the
    /// quantity is not positive.
    pub fn create_order(&self, client: &str, quantity: i64) -> Result<i64, InvocationError> {
        if client.trim().is_empty() {
            return Err(InvocationError::new("client name must not be empty"));
        }
        if quantity <= 0 {
            return Err(InvocationError::new(format!(
                "quantity must be positive, got {quantity}"
            )));
        }

        let mut book = self.lock();
        let id = book.next_id;
        book.next_id = id.saturating_add(1);
        book.orders.push(Order {
            id,
            client: client.to_owned(),
            quantity,
        });
        drop(book);

        info!(target: SAMPLES_TARGET, id, client, quantity, "order created");
        Ok(id)
    }

    /// Number of open orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    /// Removes the order with `id`, returning whether it existed.
    pub fn cancel_order(&self, id: i64) -> bool {
        let mut book = self.lock();
        let before = book.orders.len();
        book.orders.retain(|order| order.id != id);
        let cancelled = book.orders.len() != before;
        drop(book);

        info!(target: SAMPLES_TARGET, id, cancelled, "order cancellation requested");
        cancelled
    }
}

impl Invocable for OrderManager {}

/// Integer calculator.
#[derive(Debug, Default, Clone, Copy)]
pub struct Calculator;

impl Calculator {
    /// Applies `operation` (`add`, `subtract`, `multiply` or `divide`) to
    /// the operands.
    ///
    /// # Errors
    ///
    /// Returns an [`InvocationError`] for unknown operations, division by
    /// zero and overflow.
    pub fn calculate(self, a: i64, b: i64, operation: &str) -> Result<i64, InvocationError> {
        let outcome = match operation {
            "add" => a.checked_add(b),
            "subtract" => a.checked_sub(b),
            "multiply" => a.checked_mul(b),
            "divide" if b == 0 => return Err(InvocationError::new("division by zero")),
            "divide" => a.checked_div(b),
            other => {
                return Err(InvocationError::new(format!(
                    "unknown operation '{other}'"
                )));
            }
        };
        outcome.ok_or_else(|| InvocationError::new(format!("{operation} overflowed")))
    }
}

impl Invocable for Calculator {}

/// Builds the catalog describing the sample objects.
///
/// # Errors
///
/// Returns [`CatalogError`] if two sample types claim one class name.
pub fn catalog() -> Result<Catalog, CatalogError> {
    let mut builder = Catalog::builder();
    builder
        .class::<OrderManager>("OrderManager")
        .method(
            Signature::new("CreateOrder")
                .describe("Creates a new order for a client")
                .param("clientName", ValueType::String)
                .param("quantity", ValueType::Int)
                .returns(ValueType::Int),
            |this: &OrderManager, args| this.create_order(args.string(0), args.int(1)),
        )
        .method(
            Signature::new("GetOrderCount")
                .describe("Returns total number of active orders")
                .returns(ValueType::Int),
            |this: &OrderManager, _args| Ok(this.order_count()),
        )
        .method(
            Signature::new("CancelOrder")
                .describe("Cancels an existing order by ID")
                .param("orderId", ValueType::Int)
                .returns(ValueType::Bool),
            |this: &OrderManager, args| Ok(this.cancel_order(args.int(0))),
        );
    builder.class::<Calculator>("Calculator").method(
        Signature::new("Calculate")
            .describe("Performs mathematical calculations")
            .param("a", ValueType::Int)
            .param("b", ValueType::Int)
            .param("operation", ValueType::String)
            .returns(ValueType::Int),
        |this: &Calculator, args| this.calculate(args.int(0), args.int(1), args.string(2)),
    );
    builder.build()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn order_ids_start_at_one_thousand() {
        let manager = OrderManager::new();
        assert_eq!(manager.create_order("ACME", 5).expect("order"), 1000);
        assert_eq!(manager.create_order("ACME", 2).expect("order"), 1001);
        assert_eq!(manager.order_count(), 2);
    }

    #[rstest]
    #[case("", 3)]
    #[case("  ", 3)]
    #[case("ACME", 0)]
    #[case("ACME", -4)]
    fn invalid_orders_are_rejected(#[case] client: &str, #[case] quantity: i64) {
        let manager = OrderManager::new();
        assert!(manager.create_order(client, quantity).is_err());
        assert_eq!(manager.order_count(), 0);
    }

    #[rstest]
    fn cancelling_reports_whether_the_order_existed() {
        let manager = OrderManager::new();
        let id = manager.create_order("ACME", 1).expect("order");
        assert!(manager.cancel_order(id));
        assert!(!manager.cancel_order(id));
        assert_eq!(manager.order_count(), 0);
    }

    #[rstest]
    #[case(6, 3, "add", 9)]
    #[case(6, 3, "subtract", 3)]
    #[case(6, 3, "multiply", 18)]
    #[case(7, 2, "divide", 3)]
    fn calculator_applies_operations(
        #[case] a: i64,
        #[case] b: i64,
        #[case] operation: &str,
        #[case] expected: i64,
    ) {
        assert_eq!(Calculator.calculate(a, b, operation).expect("result"), expected);
    }

    #[rstest]
    #[case(1, 0, "divide", "division by zero")]
    #[case(1, 1, "modulo", "unknown operation 'modulo'")]
    #[case(i64::MAX, 1, "add", "add overflowed")]
    fn calculator_rejects_bad_input(
        #[case] a: i64,
        #[case] b: i64,
        #[case] operation: &str,
        #[case] message: &str,
    ) {
        let error = Calculator.calculate(a, b, operation).expect_err("must fail");
        assert_eq!(error.message(), message);
    }

    #[rstest]
    fn catalog_describes_both_classes() {
        let catalog = catalog().expect("sample catalog builds");
        assert_eq!(catalog.method_count(), 4);
        let orders = catalog.class_named("OrderManager").expect("class");
        let create = orders.method("CreateOrder").expect("method");
        assert_eq!(create.parameters().len(), 2);
        assert_eq!(create.return_type(), ValueType::Int);
        assert!(catalog.class_named("Calculator").is_some());
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// The backend writes unset fields as `null`; treat that like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceType {
    #[default]
    Sale,
    Purchase,
}

impl InvoiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceType::Sale => "SALE",
            InvoiceType::Purchase => "PURCHASE",
        }
    }

    pub fn number_prefix(&self) -> &'static str {
        match self {
            InvoiceType::Sale => "INV",
            InvoiceType::Purchase => "PINV",
        }
    }
}

/// Customer (sale) or supplier (purchase) attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Product snapshot as returned with an order item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub product_code: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub attribute: Option<String>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub selling_price: Option<f64>,
    #[serde(default)]
    pub actual_price: Option<f64>,
}

impl Product {
    pub fn discount_percent(&self) -> f64 {
        self.discount.unwrap_or(0.0)
    }

    /// Attribute worth printing under the product name ("NA" is the backend's placeholder).
    pub fn display_attribute(&self) -> Option<&str> {
        self.attribute
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty() && *a != "NA")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default)]
    pub order_item_id: Option<i64>,
    #[serde(default, alias = "product")]
    pub product_dto: Option<Product>,
    #[serde(default)]
    pub price_at_order_time: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub quantity: i64,
}

impl OrderItem {
    /// Unit rate: price captured on the order, else the product's selling or actual price.
    /// A zero order price counts as not captured.
    pub fn rate(&self) -> f64 {
        let product = self.product_dto.as_ref();
        self.price_at_order_time
            .filter(|p| *p > 0.0)
            .or_else(|| product.and_then(|p| p.selling_price))
            .or_else(|| product.and_then(|p| p.actual_price))
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    #[serde(default)]
    pub order_type: Option<InvoiceType>,
    #[serde(default)]
    pub order_status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub customer: Option<Party>,
    #[serde(default)]
    pub supplier: Option<Party>,
    #[serde(default)]
    pub order_items: Option<Vec<OrderItem>>,
    #[serde(default)]
    pub total_price: Option<f64>,
}

impl Order {
    pub fn invoice_type(&self) -> InvoiceType {
        self.order_type.unwrap_or_default()
    }

    /// The party printed on the invoice: customer for a sale, supplier for a purchase.
    pub fn party(&self) -> Option<&Party> {
        match self.invoice_type() {
            InvoiceType::Sale => self.customer.as_ref(),
            InvoiceType::Purchase => self.supplier.as_ref(),
        }
    }
}

/// Accepts either a single order object or an array of orders.
pub fn parse_orders(json: &str) -> serde_json::Result<Vec<Order>> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Order>),
        One(Box<Order>),
    }

    Ok(match serde_json::from_str::<OneOrMany>(json)? {
        OneOrMany::Many(orders) => orders,
        OneOrMany::One(order) => vec![*order],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_backend_order_payload() {
        let json = r#"{
            "orderId": 42,
            "orderType": "PURCHASE",
            "orderStatus": "COMPLETED",
            "createdAt": "2024-03-05T10:15:30",
            "supplier": {"name": "Acme", "contactNumber": "123"},
            "orderItems": [
                {"quantity": 2, "priceAtOrderTime": 10.5,
                 "product": {"name": "Oil filter", "discount": 5.0, "attribute": "NA"}}
            ],
            "totalPrice": 21.0
        }"#;

        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.invoice_type(), InvoiceType::Purchase);
        assert_eq!(order.party().map(|p| p.name.as_str()), Some("Acme"));

        let items = order.order_items.as_ref().unwrap();
        let product = items[0].product_dto.as_ref().unwrap();
        assert_eq!(product.display_attribute(), None);
        assert_eq!(items[0].rate(), 10.5);
    }

    #[test]
    fn missing_order_type_means_sale() {
        let order: Order = serde_json::from_str(r#"{"orderId": 1, "orderItems": []}"#).unwrap();
        assert_eq!(order.invoice_type(), InvoiceType::Sale);
    }

    #[test]
    fn rate_falls_back_to_product_prices() {
        let mut item = OrderItem {
            product_dto: Some(Product {
                selling_price: None,
                actual_price: Some(7.0),
                ..Product::default()
            }),
            quantity: 1,
            ..OrderItem::default()
        };
        assert_eq!(item.rate(), 7.0);

        item.product_dto.as_mut().unwrap().selling_price = Some(9.0);
        assert_eq!(item.rate(), 9.0);
    }

    #[test]
    fn null_names_and_quantity_degrade_to_defaults() {
        let orders = parse_orders(
            r#"{"orderId": 5,
                "customer": {"name": null, "contactNumber": null},
                "orderItems": [{"quantity": null, "productDto": {"name": null, "sellingPrice": 12.0}}]}"#,
        )
        .unwrap();

        let order = &orders[0];
        assert_eq!(order.customer.as_ref().unwrap().name, "");
        let item = &order.order_items.as_ref().unwrap()[0];
        assert_eq!(item.quantity, 0);
        assert_eq!(item.product_dto.as_ref().unwrap().name, "");
    }

    #[test]
    fn zero_order_price_falls_back_to_selling_price() {
        let item = OrderItem {
            price_at_order_time: Some(0.0),
            product_dto: Some(Product {
                selling_price: Some(45.0),
                ..Product::default()
            }),
            quantity: 1,
            ..OrderItem::default()
        };
        assert_eq!(item.rate(), 45.0);
    }

    #[test]
    fn parse_orders_accepts_object_or_array() {
        let one = parse_orders(r#"{"orderId": 3}"#).unwrap();
        assert_eq!(one.len(), 1);

        let many = parse_orders(r#"[{"orderId": 3}, {"orderId": 4}]"#).unwrap();
        assert_eq!(many.iter().map(|o| o.order_id).collect::<Vec<_>>(), vec![3, 4]);
    }
}

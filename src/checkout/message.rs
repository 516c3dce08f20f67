//! Order message
//!
//! The text the store receives through the handoff channel. The layout is fixed:
//!
//! ```text
//! Olá! Gostaria de fazer o seguinte pedido:
//!
//! 1. Shampoo - 2x R$ 29,90 = R$ 59,80
//! 2. Condicionador - 1x R$ 27,90 = R$ 27,90
//!
//! Subtotal: R$ 87,70
//! Desconto (PROMO10 - 10%): -R$ 8,77
//! Total: R$ 78,93
//!
//! Retirada na loja: aguardo a confirmação de que o pedido está pronto.
//! ```

use std::fmt;

use crate::{
    address::DeliveryAddress,
    checkout::{delivery::DeliveryInfo, order::OrderRecord},
    pricing::{Price, format_price},
};

const GREETING: &str = "Olá! Gostaria de fazer o seguinte pedido:";
const PICKUP_NOTICE: &str = "Retirada na loja: aguardo a confirmação de que o pedido está pronto.";
const DELIVERY_HEADING: &str = "Entrega:";
const SHIPPING_NOTE: &str = "Frete: valor a combinar, a loja informará o custo de entrega.";

/// Renders an [`OrderRecord`] as the handoff message.
#[derive(Debug, Clone, Copy)]
pub struct OrderMessage<'a>(&'a OrderRecord);

impl<'a> OrderMessage<'a> {
    /// Wrap `order` for rendering.
    pub fn new(order: &'a OrderRecord) -> Self {
        Self(order)
    }
}

impl fmt::Display for OrderMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.0;

        writeln!(f, "{GREETING}")?;
        writeln!(f)?;

        for (idx, line) in order.lines().iter().enumerate() {
            writeln!(
                f,
                "{}. {} - {}x {} = {}",
                idx + 1,
                line.title(),
                line.quantity(),
                format_price(&line.unit_price()),
                format_price(&line.line_total()),
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Subtotal: {}", format_price(&order.subtotal()))?;

        if order.discount().to_minor_units() > 0 {
            write_discount(f, order)?;
        }

        writeln!(f, "Total: {}", format_price(&order.total()))?;
        writeln!(f)?;

        match order.delivery() {
            DeliveryInfo::Pickup => write!(f, "{PICKUP_NOTICE}"),
            DeliveryInfo::Delivery(address) => write_address(f, address),
        }
    }
}

fn write_discount(f: &mut fmt::Formatter<'_>, order: &OrderRecord) -> fmt::Result {
    let amount = negated(&order.discount());

    match order.coupon() {
        Some(coupon) => writeln!(
            f,
            "Desconto ({} - {}%): {}",
            coupon.code(),
            coupon.percent_off(),
            format_price(&amount)
        ),
        None => writeln!(f, "Desconto: {}", format_price(&amount)),
    }
}

fn write_address(f: &mut fmt::Formatter<'_>, address: &DeliveryAddress) -> fmt::Result {
    writeln!(f, "{DELIVERY_HEADING}")?;
    writeln!(f, "Endereço: {}, {}", address.street, address.number)?;

    if let Some(complement) = &address.complement {
        writeln!(f, "Complemento: {complement}")?;
    }

    writeln!(f, "Bairro: {}", address.neighborhood)?;
    writeln!(f, "Cidade: {} - {}", address.city, address.state)?;
    writeln!(f, "CEP: {}", address.zip_code)?;

    if let Some(reference) = &address.reference {
        writeln!(f, "Referência: {reference}")?;
    }

    writeln!(f)?;
    write!(f, "{SHIPPING_NOTE}")
}

fn negated(price: &Price) -> Price {
    crate::pricing::from_minor(-price.to_minor_units())
}

/// Serialize `order` into the handoff message.
pub fn serialize(order: &OrderRecord) -> String {
    OrderMessage::new(order).to_string()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        address::PostalCode,
        cart::{Cart, MemoryStorage},
        checkout::order::build_order,
        coupons::CouponRegistry,
        products::{Product, ProductId},
    };

    use super::*;

    fn scenario_cart() -> Cart {
        let mut cart = Cart::load(MemoryStorage::default());

        for (id, title, price) in [
            ("shampoo", "Shampoo", "R$ 29,90"),
            ("shampoo", "Shampoo", "R$ 29,90"),
            ("condicionador", "Condicionador", "R$ 27,90"),
        ] {
            cart.add_item(&Product {
                id: ProductId::new(id),
                title: title.to_string(),
                price: price.to_string(),
                image: String::new(),
            });
        }

        cart
    }

    fn paulista(complement: Option<&str>) -> TestResult<DeliveryAddress> {
        Ok(DeliveryAddress {
            street: "Avenida Paulista".to_string(),
            number: "1000".to_string(),
            neighborhood: "Bela Vista".to_string(),
            city: "São Paulo".to_string(),
            state: "SP".to_string(),
            zip_code: PostalCode::parse("01310100")?,
            complement: complement.map(str::to_string),
            reference: None,
        })
    }

    #[test]
    fn pickup_message_with_coupon() -> TestResult {
        let coupon = CouponRegistry::default().evaluate("promo10")?;
        let order = build_order(&scenario_cart(), Some(&coupon), DeliveryInfo::Pickup)?;

        let expected = "Olá! Gostaria de fazer o seguinte pedido:\n\
                        \n\
                        1. Shampoo - 2x R$ 29,90 = R$ 59,80\n\
                        2. Condicionador - 1x R$ 27,90 = R$ 27,90\n\
                        \n\
                        Subtotal: R$ 87,70\n\
                        Desconto (PROMO10 - 10%): -R$ 8,77\n\
                        Total: R$ 78,93\n\
                        \n\
                        Retirada na loja: aguardo a confirmação de que o pedido está pronto.";

        assert_eq!(serialize(&order), expected);

        Ok(())
    }

    #[test]
    fn zero_discount_omits_discount_line() -> TestResult {
        let coupon = CouponRegistry::default().evaluate("FRETE")?;
        let order = build_order(&scenario_cart(), Some(&coupon), DeliveryInfo::Pickup)?;

        let message = serialize(&order);

        assert!(!message.contains("Desconto"), "no discount line expected");
        assert!(message.contains("Total: R$ 87,70"), "total equals subtotal");

        Ok(())
    }

    #[test]
    fn delivery_message_includes_address_block() -> TestResult {
        let order = build_order(
            &scenario_cart(),
            None,
            DeliveryInfo::Delivery(paulista(Some("Apto 12"))?),
        )?;

        let message = serialize(&order);

        let expected_tail = "Total: R$ 87,70\n\
                             \n\
                             Entrega:\n\
                             Endereço: Avenida Paulista, 1000\n\
                             Complemento: Apto 12\n\
                             Bairro: Bela Vista\n\
                             Cidade: São Paulo - SP\n\
                             CEP: 01310-100\n\
                             \n\
                             Frete: valor a combinar, a loja informará o custo de entrega.";

        assert!(
            message.ends_with(expected_tail),
            "unexpected delivery section:\n{message}"
        );
        assert!(!message.contains("Retirada"), "no pickup notice on delivery");

        Ok(())
    }

    #[test]
    fn serialize_is_deterministic() -> TestResult {
        let order = build_order(
            &scenario_cart(),
            None,
            DeliveryInfo::Delivery(paulista(None)?),
        )?;

        assert_eq!(serialize(&order), serialize(&order));
        assert!(!serialize(&order).contains("Complemento"), "empty complement is omitted");

        Ok(())
    }
}

//! Cart summary table

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

use crate::{
    cart::{Cart, CartStorage},
    pricing::format_price,
};

/// Write the cart as a table followed by the item count and subtotal.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_cart_table<S: CartStorage>(cart: &Cart<S>, mut out: impl io::Write) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Cart is empty.");
    }

    let mut builder = Builder::default();

    builder.push_record(["", "Product", "Title", "Qty", "Unit Price", "Total"]);

    for (idx, line) in cart.lines().iter().enumerate() {
        builder.push_record([
            (idx + 1).to_string(),
            line.id().to_string(),
            line.title().to_string(),
            line.quantity().to_string(),
            format_price(&line.unit_price()),
            format_price(&line.line_total()),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "{table}")?;
    writeln!(out, "Items:    {}", cart.item_count())?;
    writeln!(out, "Subtotal: {}", format_price(&cart.subtotal()))
}

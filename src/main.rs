//! Boutique CLI

use std::{
    io::{self, Write},
    process::ExitCode,
};

use anyhow::Context as _;
use boutique::{
    address::{AddressField, AddressResolver},
    cart::{Cart, write_cart_table},
    checkout::{Checkout, CheckoutOutcome, DeliveryType, StdoutOpener, WhatsAppHandoff},
    config::ShopConfig,
    coupons::CouponSlot,
    observability::init_logging,
    pricing::format_price,
    products::{Product, ProductId},
};
use clap::{Args, Parser, Subcommand};
use tracing::error;

#[derive(Debug, Parser)]
#[command(name = "boutique", about = "Boutique cart and checkout", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ShopConfig,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show or change the cart
    Cart(CartCommand),

    /// Check a coupon code against the cart subtotal
    Coupon {
        /// Coupon code
        code: String,
    },

    /// Send the order to the store
    Checkout(CheckoutCommand),
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// List the cart
    List,

    /// Add one unit of a product
    Add(AddArgs),

    /// Remove a product
    Remove {
        /// Product id
        id: String,
    },

    /// Add one more unit of a product already in the cart
    Increase {
        /// Product id
        id: String,
    },

    /// Take one unit off a product, keeping at least one
    Decrease {
        /// Product id
        id: String,
    },
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    #[arg(long)]
    id: String,

    /// Product title
    #[arg(long)]
    title: String,

    /// Display price, e.g. "R$ 29,90"
    #[arg(long)]
    price: String,

    /// Product image URL
    #[arg(long, default_value = "")]
    image: String,
}

#[derive(Debug, Args)]
struct CheckoutCommand {
    /// Coupon code to apply
    #[arg(long)]
    coupon: Option<String>,

    #[command(subcommand)]
    delivery: DeliveryCommand,
}

#[derive(Debug, Subcommand)]
enum DeliveryCommand {
    /// Collect the order at the store
    Pickup,

    /// Deliver the order to an address
    Delivery(DeliveryArgs),
}

#[derive(Debug, Args)]
struct DeliveryArgs {
    /// Postal code (CEP)
    #[arg(long)]
    zip: String,

    /// House or building number
    #[arg(long)]
    number: String,

    /// Street, when the postal code does not resolve it
    #[arg(long)]
    street: Option<String>,

    /// Neighborhood, when the postal code does not resolve it
    #[arg(long)]
    neighborhood: Option<String>,

    /// City, when the postal code does not resolve it
    #[arg(long)]
    city: Option<String>,

    /// State abbreviation, when the postal code does not resolve it
    #[arg(long)]
    state: Option<String>,

    /// Apartment, block, etc.
    #[arg(long)]
    complement: Option<String>,

    /// Landmark to help the courier
    #[arg(long)]
    reference: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::load().unwrap_or_else(|error| error.exit());

    if let Err(error) = init_logging(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for the error"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error:#}");

            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut out = io::stdout();

    match cli.command {
        Commands::Cart(CartCommand { command }) => cart(&cli.config, command, &mut out),
        Commands::Coupon { code } => coupon(&cli.config, &code, &mut out),
        Commands::Checkout(command) => checkout(&cli.config, command, &mut out).await,
    }
}

fn cart(config: &ShopConfig, command: CartSubcommand, out: &mut impl Write) -> anyhow::Result<()> {
    let mut cart = Cart::load(config.cart_storage());

    match command {
        CartSubcommand::List => {}
        CartSubcommand::Add(args) => cart.add_item(&Product {
            id: ProductId::new(args.id),
            title: args.title,
            price: args.price,
            image: args.image,
        }),
        CartSubcommand::Remove { id } => cart.remove_item(&ProductId::new(id)),
        CartSubcommand::Increase { id } => cart.increase_quantity(&ProductId::new(id)),
        CartSubcommand::Decrease { id } => cart.decrease_quantity(&ProductId::new(id)),
    }

    write_cart_table(&cart, out).context("failed to write cart")
}

fn coupon(config: &ShopConfig, code: &str, out: &mut impl Write) -> anyhow::Result<()> {
    let registry = config.coupon_registry()?;
    let cart = Cart::load(config.cart_storage());

    match registry.evaluate(code) {
        Ok(coupon) => {
            let subtotal = cart.subtotal();
            let discount = coupon.discount_on(&subtotal)?;

            writeln!(
                out,
                "{} applied: {}% off, -{} on {}",
                coupon.code(),
                coupon.percent_off(),
                format_price(&discount),
                format_price(&subtotal)
            )?;
        }
        Err(error) => writeln!(out, "{error}")?,
    }

    Ok(())
}

async fn checkout(
    config: &ShopConfig,
    command: CheckoutCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let cart = Cart::load(config.cart_storage());
    let registry = config.coupon_registry()?;

    let mut coupon = CouponSlot::default();

    if let Some(code) = &command.coupon {
        coupon.apply(&registry, code)?;
    }

    let mut resolver = AddressResolver::new();

    let delivery_type = match command.delivery {
        DeliveryCommand::Pickup => DeliveryType::Pickup,
        DeliveryCommand::Delivery(args) => {
            fill_address(config, &mut resolver, args, out).await?;

            DeliveryType::Delivery
        }
    };

    let checkout = Checkout::new(
        WhatsAppHandoff::new(StdoutOpener),
        config.store.store_contact.clone(),
    );

    match checkout.checkout(&cart, coupon.active(), delivery_type, &resolver)? {
        CheckoutOutcome::Skipped => writeln!(out, "Cart is empty; nothing to send.")?,
        CheckoutOutcome::Dispatched { message } => writeln!(out, "\n{message}")?,
    }

    Ok(())
}

async fn fill_address(
    config: &ShopConfig,
    resolver: &mut AddressResolver,
    args: DeliveryArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let lookup = config.lookup_client();

    resolver.enter_postal_code(&lookup, &args.zip).await;

    if let Some(request) = resolver.blur_postal_code() {
        resolver.resolve(&lookup, request).await;
    }

    if let Some(error) = resolver.error() {
        writeln!(out, "{error}")?;
    }

    let typed = [
        (AddressField::Street, args.street),
        (AddressField::Number, Some(args.number)),
        (AddressField::Neighborhood, args.neighborhood),
        (AddressField::City, args.city),
        (AddressField::State, args.state),
        (AddressField::Complement, args.complement),
        (AddressField::Reference, args.reference),
    ];

    for (field, value) in typed {
        let Some(value) = value else {
            continue;
        };

        if resolver.form().is_locked(field) {
            writeln!(
                out,
                "{field} was filled from the postal code; keeping \"{}\"",
                resolver.form().value(field)
            )?;

            continue;
        }

        resolver.edit(field, value)?;
    }

    for field in AddressField::REQUIRED {
        if let Some(hint) = resolver.hint(field) {
            writeln!(out, "{field}: {hint}")?;
        }
    }

    Ok(())
}

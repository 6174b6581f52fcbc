//! Local cart commands.
//!
//! # Usage
//!
//! ```bash
//! dacsan cart add 42 "Ổi" 15000 --image /a.jpg
//! dacsan cart update 42 3
//! dacsan cart remove 42
//! dacsan cart count --markup
//! ```
//!
//! # Environment Variables
//!
//! - `CART_STORAGE_DIR` - Directory holding the cart file (default `.dacsan`)
//! - `CART_STORAGE_KEY` - Key the cart is stored under (default `shopping_cart`)
//! - `CART_WRITE_POLICY` - `last-write-wins` or `compare-and-swap`
//! - `CART_QUOTA_BYTES` - Optional storage quota

use std::io::Write;

use askama::Template;
use clap::Subcommand;

use dacsan_core::{Cart, NewCartItem, Price, ProductId};
use dacsan_storefront::{
    BrowsingContext, CartBadgeView, CartDropdownView, CartStore, StorefrontConfig,
};

use super::CommandError;

#[derive(Subcommand)]
pub enum CartAction {
    /// Print the cart lines and total
    Show {
        /// Print the header dropdown markup instead
        #[arg(long)]
        markup: bool,
    },
    /// Add a product, or more of one already in the cart
    Add {
        /// Product ID
        product_id: i64,
        /// Product name
        name: String,
        /// Unit price in dong
        price: i64,
        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
        /// Product image URL
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Set a line's quantity; zero or less removes the line
    Update {
        /// Product ID
        product_id: i64,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Product ID
        product_id: i64,
    },
    /// Empty the cart
    Clear,
    /// Print the number of units in the cart
    Count {
        /// Print the header badge markup instead
        #[arg(long)]
        markup: bool,
    },
}

/// Run a cart command against the configured file-backed store.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the storage directory
/// cannot be opened, or output cannot be written.
pub fn run(action: CartAction, out: &mut impl Write) -> Result<(), CommandError> {
    let config = StorefrontConfig::from_env()?;
    let partition = config.open_partition()?;
    let store = CartStore::with_options(partition.open_context(), config.store_options());
    tracing::debug!(dir = %config.storage_dir.display(), key = store.key(), "Opened cart");

    execute(&store, action, out)
}

/// Apply `action` to `store` and write the result.
///
/// # Errors
///
/// Returns an error if output cannot be written.
pub fn execute(
    store: &CartStore<BrowsingContext>,
    action: CartAction,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    match action {
        CartAction::Show { markup: false } => write_cart(out, &store.get_cart())?,
        CartAction::Show { markup: true } => {
            let view = CartDropdownView::from(&store.get_cart());
            writeln!(out, "{}", render(&view)?)?;
        }
        CartAction::Add {
            product_id,
            name,
            price,
            quantity,
            image,
        } => {
            let cart = store.add_item(NewCartItem {
                product_id: ProductId::new(product_id),
                product_name: name,
                unit_price: Price::from_dong(price),
                quantity,
                image_url: image,
            });
            write_cart(out, &cart)?;
        }
        CartAction::Update {
            product_id,
            quantity,
        } => write_cart(out, &store.update_item(ProductId::new(product_id), quantity))?,
        CartAction::Remove { product_id } => {
            write_cart(out, &store.remove_item(ProductId::new(product_id)))?;
        }
        CartAction::Clear => {
            store.clear_cart();
            writeln!(out, "Giỏ hàng trống")?;
        }
        CartAction::Count { markup: false } => writeln!(out, "{}", store.get_item_count())?,
        CartAction::Count { markup: true } => {
            let view = CartBadgeView::from(&store.get_cart());
            writeln!(out, "{}", render(&view)?)?;
        }
    }
    Ok(())
}

fn render(template: &impl Template) -> Result<String, CommandError> {
    Ok(template.render()?)
}

fn write_cart(out: &mut impl Write, cart: &Cart) -> std::io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Giỏ hàng trống");
    }
    for item in cart.items() {
        writeln!(
            out,
            "[{}] {} × {} @ {} = {}",
            item.product_id,
            item.quantity,
            item.product_name,
            item.unit_price,
            item.line_total()
        )?;
    }
    writeln!(out, "Tổng: {} ({} sản phẩm)", cart.total(), cart.item_count())
}

use std::{fmt, str::FromStr};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Species {
    Perros,
    Gatos,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::Perros => write!(f, "perros"),
            Species::Gatos => write!(f, "gatos"),
        }
    }
}

/// Filter of the product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Only(Species),
}

impl FromStr for Category {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "all" | "todos" | "" => Ok(Category::All),
            "perros" => Ok(Category::Only(Species::Perros)),
            "gatos" => Ok(Category::Only(Species::Gatos)),
            other => Err(format!("Unknown category {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: &'static str,
    pub price: u32,
    pub category: Species,
    pub image: &'static str,
    pub discount_percent: u8,
}

pub static PRODUCTS: [Product; 8] = [
    Product {
        name: "PX Formula Adultos",
        price: 25000,
        category: Species::Perros,
        image: "dog-food-1.jpg",
        discount_percent: 10,
    },
    Product {
        name: "Tasty Gato Adulto",
        price: 20000,
        category: Species::Gatos,
        image: "cat-food-1.jpg",
        discount_percent: 5,
    },
    Product {
        name: "Collar para perro",
        price: 8000,
        category: Species::Perros,
        image: "dog-collar.jpg",
        discount_percent: 0,
    },
    Product {
        name: "Correa para perro",
        price: 9000,
        category: Species::Perros,
        image: "dog-leash.jpg",
        discount_percent: 0,
    },
    Product {
        name: "Juguete para gato",
        price: 5000,
        category: Species::Gatos,
        image: "cat-toy.jpg",
        discount_percent: 15,
    },
    Product {
        name: "Juguete para perro",
        price: 7000,
        category: Species::Perros,
        image: "dog-toy.jpg",
        discount_percent: 0,
    },
    Product {
        name: "Cama para gato",
        price: 25000,
        category: Species::Gatos,
        image: "cat-bed.jpg",
        discount_percent: 20,
    },
    Product {
        name: "Rascador para gato",
        price: 30000,
        category: Species::Gatos,
        image: "cat-scratcher.jpg",
        discount_percent: 0,
    },
];

/// Display data of one product card.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub name: &'static str,
    pub image: &'static str,
    pub final_price: u32,
    /// Struck-through original price, only for discounted products.
    pub original_price: Option<u32>,
    pub badge: Option<String>,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let discounted = product.discount_percent > 0;
        ProductCard {
            name: product.name,
            image: product.image,
            final_price: discounted_price(product.price, product.discount_percent),
            original_price: discounted.then_some(product.price),
            badge: discounted.then(|| format!("-{}%", product.discount_percent)),
        }
    }
}

/// Rounded to whole pesos.
pub fn discounted_price(price: u32, discount_percent: u8) -> u32 {
    (f64::from(price) * (1.0 - f64::from(discount_percent) / 100.0)).round() as u32
}

/// `22500` -> `$22.500`.
pub fn format_price(price: u32) -> String {
    let digits = price.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    grouped.push('$');
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}

pub fn filter(products: &[Product], category: Category) -> Vec<&Product> {
    products
        .iter()
        .filter(|product| match category {
            Category::All => true,
            Category::Only(species) => product.category == species,
        })
        .collect()
}

impl ProductCard {
    pub fn to_html(&self) -> String {
        let original = self
            .original_price
            .map(|price| format!("<del>{}</del> ", format_price(price)))
            .unwrap_or_default();
        let badge = self
            .badge
            .as_ref()
            .map(|badge| format!(r#"<span class="badge bg-danger">{badge}</span>"#))
            .unwrap_or_default();
        format!(
            r#"<div class="col-md-3 mb-4"><div class="card product-card"><img src="{image}" class="card-img-top" alt="{name}"><div class="card-body"><h5 class="card-title">{name}</h5><p class="card-text">{original}<strong>{price}</strong></p>{badge}<button class="btn btn-primary mt-2">Agregar al carrito</button></div></div></div>"#,
            image = self.image,
            name = self.name,
            price = format_price(self.final_price),
        )
    }
}

/// The product listing with its active filter button.
#[derive(Debug, Default)]
pub struct Catalog {
    active: Category,
}

impl Catalog {
    pub fn active(&self) -> Category {
        self.active
    }

    /// Filter button click. Re-rendering the same filter yields the same markup.
    pub fn select(&mut self, category: Category) -> String {
        self.active = category;
        self.render_html()
    }

    pub fn cards(&self) -> Vec<ProductCard> {
        filter(&PRODUCTS, self.active)
            .into_iter()
            .map(ProductCard::from)
            .collect()
    }

    pub fn render_html(&self) -> String {
        self.cards().iter().map(ProductCard::to_html).collect()
    }
}

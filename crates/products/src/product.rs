use core::str::FromStr;

use serde::{Deserialize, Serialize};

use farmstand_core::{DomainError, DomainResult, ProductId};

/// Fixed set of product categories offered by the stand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fruit,
    Vegetable,
    Dairy,
}

impl Category {
    /// Every category, in the order forms present them.
    pub const ALL: [Category; 3] = [Category::Fruit, Category::Vegetable, Category::Dairy];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fruit => "fruit",
            Category::Vegetable => "vegetable",
            Category::Dairy => "dairy",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                DomainError::validation(format!(
                    "category: `{s}` is not a valid category (expected one of: fruit, vegetable, dairy)"
                ))
            })
    }
}

/// Fields required to create a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub category: Category,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64, category: Category) -> Self {
        Self {
            name: name.into(),
            price,
            category,
        }
    }

    /// Check the required/type constraints every persisted product satisfies.
    pub fn validate(&self) -> DomainResult<()> {
        validate_name(&self.name)?;
        validate_price(self.price)?;
        Ok(())
    }
}

/// Partial update: `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.category.is_none()
    }
}

/// Entity: Product.
///
/// Instances are only constructed through [`Product::new`] and [`Product::patched`],
/// both of which validate, so a `Product` value always satisfies the catalog rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    price: f64,
    category: Category,
}

impl Product {
    pub fn new(id: ProductId, fields: NewProduct) -> DomainResult<Self> {
        fields.validate()?;
        Ok(Self {
            id,
            name: fields.name,
            price: fields.price,
            category: fields.category,
        })
    }

    pub fn id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Merge `patch` into a copy of this product and validate the result as if newly created.
    ///
    /// The identifier never changes.
    pub fn patched(&self, patch: &ProductPatch) -> DomainResult<Self> {
        let merged = NewProduct {
            name: patch.name.clone().unwrap_or_else(|| self.name.clone()),
            price: patch.price.unwrap_or(self.price),
            category: patch.category.unwrap_or(self.category),
        };
        Product::new(self.id, merged)
    }

    /// The writable fields of this product.
    pub fn fields(&self) -> NewProduct {
        NewProduct::new(self.name.clone(), self.price, self.category)
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name: a product name is required"));
    }
    Ok(())
}

fn validate_price(price: f64) -> DomainResult<()> {
    if !price.is_finite() {
        return Err(DomainError::validation("price: must be a finite number"));
    }
    if price < 0.0 {
        return Err(DomainError::validation(format!(
            "price: {price} is less than the minimum allowed value (0)"
        )));
    }
    Ok(())
}

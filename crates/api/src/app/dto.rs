use serde::{Deserialize, Serialize};

use farmstand_core::{DomainError, DomainResult};
use farmstand_products::{Category, NewProduct, Product, ProductPatch};

// -------------------------
// Request DTOs
// -------------------------

/// Body of the create/edit forms (`application/x-www-form-urlencoded`).
///
/// Every field arrives as raw text; [`ProductForm::into_new_product`] and
/// [`ProductForm::into_patch`] are the boundary where it gets typed and checked.
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub category: Option<String>,
}

impl ProductForm {
    /// All three fields are required.
    pub fn into_new_product(self) -> DomainResult<NewProduct> {
        let name = self
            .name
            .ok_or_else(|| DomainError::validation("name: a product name is required"))?;
        let price = parse_price(
            self.price
                .as_deref()
                .ok_or_else(|| DomainError::validation("price: a price is required"))?,
        )?;
        let category = parse_category(
            self.category
                .as_deref()
                .ok_or_else(|| DomainError::validation("category: a category is required"))?,
        )?;

        let fields = NewProduct::new(name, price, category);
        fields.validate()?;
        Ok(fields)
    }

    /// Absent fields are left unchanged; present fields must be well-formed.
    pub fn into_patch(self) -> DomainResult<ProductPatch> {
        Ok(ProductPatch {
            name: self.name,
            price: self.price.as_deref().map(parse_price).transpose()?,
            category: self.category.as_deref().map(parse_category).transpose()?,
        })
    }
}

/// Query string of the list page.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// What the list page was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Category(Category),
    /// A value outside the enumeration. Nothing can match it.
    Unmatched(String),
}

impl ListFilter {
    /// Heading shown above the list.
    pub fn label(&self) -> &str {
        match self {
            ListFilter::All => "All",
            ListFilter::Category(category) => category.as_str(),
            ListFilter::Unmatched(raw) => raw,
        }
    }
}

impl ListQuery {
    /// An empty `category` means "no filter". An unknown one is not an error,
    /// it simply matches no product.
    pub fn filter(&self) -> ListFilter {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => ListFilter::All,
            Some(raw) => match parse_category(raw) {
                Ok(category) => ListFilter::Category(category),
                Err(_) => ListFilter::Unmatched(raw.to_string()),
            },
        }
    }
}

fn parse_price(raw: &str) -> DomainResult<f64> {
    let price: f64 = raw
        .trim()
        .parse()
        .map_err(|_| DomainError::validation(format!("price: `{raw}` is not a number")))?;
    if !price.is_finite() {
        return Err(DomainError::validation(format!("price: `{raw}` is not a number")));
    }
    Ok(price)
}

fn parse_category(raw: &str) -> DomainResult<Category> {
    raw.trim().parse()
}

// -------------------------
// View models
// -------------------------

/// A product as templates see it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    /// Two decimals, e.g. `1.50`.
    pub price: String,
    pub category: Category,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id().to_string(),
            name: product.name().to_string(),
            price: format_price(product.price()),
            category: product.category(),
        }
    }
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmstand_core::ProductId;

    fn form(name: Option<&str>, price: Option<&str>, category: Option<&str>) -> ProductForm {
        ProductForm {
            name: name.map(str::to_string),
            price: price.map(str::to_string),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn complete_form_becomes_new_product() {
        let fields = form(Some("Apples"), Some("1.50"), Some("fruit"))
            .into_new_product()
            .unwrap();
        assert_eq!(fields, NewProduct::new("Apples", 1.5, Category::Fruit));
    }

    #[test]
    fn missing_fields_are_rejected_on_create() {
        let cases = [
            form(None, Some("1"), Some("fruit")),
            form(Some("Apples"), None, Some("fruit")),
            form(Some("Apples"), Some("1"), None),
        ];
        for case in cases {
            let err = case.into_new_product().unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)));
        }
    }

    #[test]
    fn malformed_values_are_rejected() {
        let cases = [
            form(Some("Steak"), Some("9.99"), Some("meat")),
            form(Some("Apples"), Some("cheap"), Some("fruit")),
            form(Some("Apples"), Some("NaN"), Some("fruit")),
            form(Some("Apples"), Some("-2"), Some("fruit")),
            form(Some(""), Some("1"), Some("fruit")),
        ];
        for case in cases {
            assert!(case.into_new_product().is_err());
        }
    }

    #[test]
    fn patch_keeps_absent_fields_unset() {
        let patch = form(None, Some("3.25"), None).into_patch().unwrap();
        assert_eq!(
            patch,
            ProductPatch {
                price: Some(3.25),
                ..ProductPatch::default()
            }
        );
    }

    #[test]
    fn patch_rejects_bad_category() {
        let err = form(None, None, Some("meat")).into_patch().unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn list_query_filters() {
        let query = |raw: Option<&str>| ListQuery {
            category: raw.map(str::to_string),
        };

        assert_eq!(query(None).filter(), ListFilter::All);
        assert_eq!(query(Some("")).filter(), ListFilter::All);
        assert_eq!(
            query(Some("dairy")).filter(),
            ListFilter::Category(Category::Dairy)
        );

        let unknown = query(Some("meat")).filter();
        assert_eq!(unknown, ListFilter::Unmatched("meat".to_string()));
        assert_eq!(unknown.label(), "meat");
        assert_eq!(ListFilter::All.label(), "All");
    }

    #[test]
    fn view_formats_price_with_two_decimals() {
        let product = Product::new(
            ProductId::new(),
            NewProduct::new("Apples", 1.5, Category::Fruit),
        )
        .unwrap();
        let view = ProductView::from(&product);
        assert_eq!(view.price, "1.50");
        assert_eq!(view.id, product.id().to_string());
    }
}

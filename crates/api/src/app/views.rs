//! Server-side HTML rendering.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::app::errors::AppError;

/// Templates compiled into the binary, by name.
const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("products/index.html", include_str!("../../templates/products/index.html")),
    ("products/new.html", include_str!("../../templates/products/new.html")),
    ("products/show.html", include_str!("../../templates/products/show.html")),
    ("products/edit.html", include_str!("../../templates/products/edit.html")),
];

/// Named-template renderer. `.html` templates are auto-escaped.
#[derive(Debug)]
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, AppError> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::dto::ProductView;
    use farmstand_core::ProductId;
    use farmstand_products::{Category, NewProduct, Product};
    use minijinja::context;

    fn apples() -> ProductView {
        let product = Product::new(
            ProductId::new(),
            NewProduct::new("Apples", 1.5, Category::Fruit),
        )
        .unwrap();
        ProductView::from(&product)
    }

    #[test]
    fn all_templates_compile() {
        let views = Views::new().unwrap();
        for &(name, _) in TEMPLATES {
            assert!(views.env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn show_renders_name_and_price() {
        let views = Views::new().unwrap();
        let product = apples();
        let Html(html) = views
            .render("products/show.html", context! { product => &product })
            .unwrap();

        assert!(html.contains("Apples"));
        assert!(html.contains("1.50"));
        assert!(html.contains(&format!("/products/{}?_method=DELETE", product.id)));
    }

    #[test]
    fn index_lists_products_with_category_label() {
        let views = Views::new().unwrap();
        let Html(html) = views
            .render(
                "products/index.html",
                context! { products => vec![apples()], category => "fruit" },
            )
            .unwrap();

        assert!(html.contains("fruit Products"));
        assert!(html.contains("Apples"));
    }

    #[test]
    fn edit_preselects_current_category() {
        let views = Views::new().unwrap();
        let product = apples();
        let Html(html) = views
            .render(
                "products/edit.html",
                context! { product => &product, categories => Category::ALL },
            )
            .unwrap();

        assert!(html.contains(r#"<option value="fruit" selected>"#));
        assert!(html.contains(r#"<option value="dairy">"#));
        assert!(html.contains(&format!("/products/{}?_method=PUT", product.id)));
    }

    #[test]
    fn names_are_html_escaped() {
        let views = Views::new().unwrap();
        let product = Product::new(
            ProductId::new(),
            NewProduct::new("<script>x</script>", 1.0, Category::Dairy),
        )
        .unwrap();
        let Html(html) = views
            .render("products/show.html", context! { product => ProductView::from(&product) })
            .unwrap();

        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let views = Views::new().unwrap();
        let err = views.render("products/missing.html", context! {}).unwrap_err();
        assert!(matches!(err, AppError::Unknown(_)));
    }
}

use crate::domain::models::{CategoryList, Product, ProductList};
use crate::services::http::{ApiClient, ApiError};

pub fn all_products(api: &ApiClient) -> anyhow::Result<Vec<Product>> {
    Ok(api.get("/getAllProductsFlat/", &[])?)
}

pub fn by_category(api: &ApiClient, category: &str) -> anyhow::Result<Vec<Product>> {
    let list: ProductList = api.get(
        "/getProductbyCategory/",
        &[("categoryencode", category.to_string())],
    )?;
    Ok(list.products)
}

/// Free-text search. The backend answers "nothing matched" with a 404,
/// which is an empty result here rather than an error.
pub fn search(api: &ApiClient, query: &str) -> anyhow::Result<Vec<Product>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }
    match api.get::<ProductList>("/products/search", &[("query", query.to_string())]) {
        Ok(list) => Ok(list.products),
        Err(e) if is_empty_search(&e) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn is_empty_search(e: &ApiError) -> bool {
    e.status() == Some(404) && !e.is_restriction()
}

pub fn product_detail(api: &ApiClient, product_id: &str) -> anyhow::Result<Product> {
    let found: Vec<Product> = api.get(&format!("/Item/{}", product_id), &[])?;
    found
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("product not found: {}", product_id))
}

pub fn related(api: &ApiClient, product_id: &str) -> anyhow::Result<Vec<Product>> {
    let list: ProductList = api.get(&format!("/RelatedItem/{}", product_id), &[])?;
    Ok(list.products)
}

pub fn top_rated(api: &ApiClient) -> anyhow::Result<Vec<Product>> {
    Ok(api.get("/getHighestRatedProducts/", &[])?)
}

/// Category names, skipping the null and blank entries the backend emits
/// for uncategorized rows.
pub fn categories(api: &ApiClient) -> anyhow::Result<Vec<String>> {
    let list: CategoryList = api.get("/getAllCategory/", &[])?;
    Ok(clean_categories(list))
}

fn clean_categories(list: CategoryList) -> Vec<String> {
    let mut out: Vec<String> = list
        .categories
        .into_iter()
        .flatten()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    out.dedup();
    out
}

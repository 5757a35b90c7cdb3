use crate::CatalogItem;

/// Client-side search over an already fetched catalog page. Matches are case-insensitive substrings of the item name.
/// A blank search string returns every item.
pub fn filter_by_name<'a>(items: &'a [CatalogItem], text: &str) -> Vec<&'a CatalogItem> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }
    items.iter().filter(|item| item.str_meal.to_lowercase().contains(&needle)).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn item(id: &str, name: &str) -> CatalogItem {
        CatalogItem { id_meal: id.into(), str_meal: name.into(), str_meal_thumb: None, str_instructions: None }
    }

    #[test]
    fn filters_case_insensitively() {
        let items = vec![item("1", "Teriyaki Chicken"), item("2", "Beef Pho"), item("3", "chicken curry")];
        let ids = filter_by_name(&items, "CHICKEN").iter().map(|i| i.id_meal.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(filter_by_name(&items, "   ").len(), 3);
        assert!(filter_by_name(&items, "sushi").is_empty());
    }
}

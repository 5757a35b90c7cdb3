use feast_common::MenuItemRef;
use serde::{Deserialize, Serialize};

/// One recipe record, as returned by the catalog. Only the fields the app reads are kept; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "idMeal")]
    pub id_meal: String,
    #[serde(rename = "strMeal")]
    pub str_meal: String,
    #[serde(rename = "strMealThumb", default)]
    pub str_meal_thumb: Option<String>,
    #[serde(rename = "strInstructions", default)]
    pub str_instructions: Option<String>,
}

impl CatalogItem {
    pub fn menu_item(&self) -> MenuItemRef {
        MenuItemRef::new(self.id_meal.as_str(), self.str_meal.as_str())
    }
}

/// The envelope for both `search.php` and `lookup.php`. The API returns `"meals": null` when nothing matches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogResponse {
    #[serde(default)]
    pub meals: Option<Vec<CatalogItem>>,
}

impl CatalogResponse {
    pub fn into_items(self) -> Vec<CatalogItem> {
        self.meals.unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SEARCH_RESPONSE: &str = r#"{
      "meals": [
        {
          "idMeal": "52772",
          "strMeal": "Teriyaki Chicken Casserole",
          "strCategory": "Chicken",
          "strInstructions": "Preheat oven to 350F.",
          "strMealThumb": "https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
          "strIngredient1": "soy sauce"
        },
        {
          "idMeal": "52959",
          "strMeal": "Baked salmon with fennel & tomatoes",
          "strMealThumb": null
        }
      ]
    }"#;

    #[test]
    fn parses_search_payload() {
        let response: CatalogResponse = serde_json::from_str(SEARCH_RESPONSE).unwrap();
        let items = response.into_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id_meal, "52772");
        assert_eq!(items[0].str_instructions.as_deref(), Some("Preheat oven to 350F."));
        assert!(items[1].str_meal_thumb.is_none());
        assert!(items[1].str_instructions.is_none());
        assert_eq!(items[0].menu_item(), MenuItemRef::new("52772", "Teriyaki Chicken Casserole"));
    }

    #[test]
    fn null_meals_is_empty() {
        let response: CatalogResponse = serde_json::from_str(r#"{"meals": null}"#).unwrap();
        assert!(response.into_items().is_empty());
    }
}

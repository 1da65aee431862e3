use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Static configuration mapping a blank type (the top-level count sheet the
/// user picks first) to its ordered list of categories.
///
/// The engine treats categories as opaque labels; the catalog only exists so
/// the transport can offer a category menu per blank type. Deployments load
/// their own catalog from JSON or use the built-in default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryCatalog {
    #[schemars(description = "Blank type name mapped to its ordered category list")]
    pub blanks: BTreeMap<String, Vec<String>>,
}

impl CategoryCatalog {
    /// Ordered categories offered for a blank type, if the blank exists.
    pub fn categories(&self, blank_type: &str) -> Option<&[String]> {
        self.blanks.get(blank_type).map(Vec::as_slice)
    }

    pub fn blank_types(&self) -> impl Iterator<Item = &str> {
        self.blanks.keys().map(String::as_str)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(CategoryCatalog)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

impl Default for CategoryCatalog {
    /// The production count sheets: general bar goods and alcohol.
    fn default() -> Self {
        let mut blanks = BTreeMap::new();

        blanks.insert(
            "bar".to_string(),
            vec![
                "БАР - ПРОЧЕЕ товар",
                "БЕЗАЛКОГОЛЬНЫЕ НАПИТКИ**",
                "ЧАЙ/КОФЕ товар",
                "КОНДИТЕРКА/ВЫПЕЧКА",
                "КОНСЕРВАЦИЯ",
                "СОУСЫ",
                "СПЕЦИИ",
                "СЫПУЧИЕ",
                "ЧАЙ, КОФЕ",
                "ЗЕЛЕНЬ",
                "МОЛОЧНЫЕ ПРОДУКТЫ",
                "ОВОЩИ СВЕЖИЕ",
                "ФРУКТЫ",
                "ЯГОДЫ С/М",
                "НАПИТКИ БЛ ПФ",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        blanks.insert(
            "alcohol".to_string(),
            vec![
                "ВИНО БЕЛОЕ",
                "ВИНО КРАСНОЕ",
                "ВИНО ОРАНЖЕВОЕ",
                "ВЕРМУТ",
                "ШАМПАНСКОЕ/ИГРИСТОЕ",
                "ВИСКИ",
                "ВОДКА",
                "ГОРЬКИЕ НАСТОЙКИ",
                "ДЖИН",
                "КАЛЬВАДОС",
                "КОНЬЯК/АРМАНЬЯК",
                "ЛИКЕРЫ",
                "ПИВО РАЗЛИВНОЕ",
                "ПОРТВЕЙН",
                "ПОРТО/ХЕРЕС",
                "РОМ",
                "ТЕКИЛА",
                "ПИВО БУТЫЛКА",
                "БЕЗАЛКОГОЛЬНОЕ ПИВО",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        Self { blanks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_has_production_blanks() {
        let catalog = CategoryCatalog::default();

        let blanks: Vec<&str> = catalog.blank_types().collect();
        assert_eq!(blanks, vec!["alcohol", "bar"]);

        let alcohol = catalog.categories("alcohol").unwrap();
        assert!(alcohol.iter().any(|c| c == "ВОДКА"));
        assert_eq!(alcohol.len(), 19);

        let bar = catalog.categories("bar").unwrap();
        assert_eq!(bar.len(), 15);
    }

    #[test]
    fn test_unknown_blank_type() {
        let catalog = CategoryCatalog::default();
        assert!(catalog.categories("kitchen").is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = CategoryCatalog::default();
        let json = catalog.to_json().unwrap();
        let back = CategoryCatalog::from_json(&json).unwrap();
        assert_eq!(back, catalog);
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = CategoryCatalog::schema_as_json().unwrap();
        assert!(schema_json.contains("blanks"));
    }
}

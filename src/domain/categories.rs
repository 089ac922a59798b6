/// Grocery products the bundled model was trained on. Index is the class id.
const GROCERY_PRODUCTS: [&str; 10] = [
    "Doritos Hot Corn Acı Biberli Mısır Cipsi",
    "Eti Karam %70 Kakaolu Bitter Çikolata",
    "Yumoş Extra Konsantre Çamaşır Yumuşatıcı Sakura",
    "Elidor Kepeğe Karşı Etkili 2'si 1 Arada Şampuan",
    "Asya Su",
    "Tarım Kredi Birlik Demlik Süzen Poşet Siyah Çay 48'li",
    "Kurukahveci Mehmet Efendi Türk Kahvesi",
    "Pınar Süzme Peynir",
    "Pastavilla Kelebek Makarna",
    "Billur Tuz",
];

/// Ordered class-id to label lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTable {
    labels: Vec<String>,
}

impl CategoryTable {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    pub fn grocery() -> Self {
        Self::new(GROCERY_PRODUCTS.iter().map(|s| s.to_string()).collect())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Label for `class_id`, or `class_<id>` when the id is outside the table.
    pub fn label_for(&self, class_id: usize) -> String {
        self.labels
            .get(class_id)
            .cloned()
            .unwrap_or_else(|| format!("class_{}", class_id))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::grocery()
    }
}

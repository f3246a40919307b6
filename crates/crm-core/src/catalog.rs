/// One of the fixed-price product tiers.
#[derive(Clone, Debug)]
pub struct Package {
    pub code: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub emoji: String,
    /// Price in minor units (sum).
    pub price: i64,
}

/// The static package catalog. Immutable for the process lifetime; lookups
/// never allocate and iteration preserves declaration order.
#[derive(Clone, Debug)]
pub struct Catalog {
    packages: Vec<Package>,
}

impl Catalog {
    pub fn new(packages: Vec<Package>) -> Self {
        Self { packages }
    }

    /// The production catalog: three tiers.
    pub fn standard() -> Self {
        Self::new(vec![
            Package {
                code: "ASOS".to_string(),
                name: "🟢 ASOS".to_string(),
                title: "Starter package".to_string(),
                description: "✨ Perfect for getting started\n\n📦 Included:\n\
                              • Feature 1\n• Feature 2\n• Feature 3\n• 24/7 support"
                    .to_string(),
                emoji: "🟢".to_string(),
                price: 50_000,
            },
            Package {
                code: "O'SISH".to_string(),
                name: "🟡 O'SISH".to_string(),
                title: "Standard package".to_string(),
                description: "⭐ The optimal choice\n\n📦 Included:\n\
                              • Everything in ASOS\n• Extended features\n\
                              • Priority support\n• Bonuses"
                    .to_string(),
                emoji: "🟡".to_string(),
                price: 100_000,
            },
            Package {
                code: "TA'SIR".to_string(),
                name: "🔴 TA'SIR".to_string(),
                title: "Premium package".to_string(),
                description: "💎 Maximum capability\n\n📦 Included:\n\
                              • Everything in O'SISH\n• VIP features\n\
                              • Personal manager\n• Exclusive content\n• Top speed"
                    .to_string(),
                emoji: "🔴".to_string(),
                price: 200_000,
            },
        ])
    }

    pub fn get(&self, code: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn codes(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.code.as_str()).collect()
    }
}

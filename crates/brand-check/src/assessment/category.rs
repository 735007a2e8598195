use serde::{Deserialize, Serialize};

/// One of the twelve brand-assessment dimensions, in survey order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MarketUnderstanding,
    CompetitiveAnalysis,
    SelfAnalysis,
    ValueProposition,
    Uniqueness,
    ProductService,
    Communication,
    InnerBranding,
    KpiManagement,
    Results,
    IpProtection,
    GrowthIntent,
}

/// Number of scored categories in every assessment.
pub const CATEGORY_COUNT: usize = 12;

/// The shared category table. Order matters: it drives prompt layout, CSV columns,
/// and the first-match rule used when prioritizing improvements.
pub const CATEGORIES: [Category; CATEGORY_COUNT] = [
    Category::MarketUnderstanding,
    Category::CompetitiveAnalysis,
    Category::SelfAnalysis,
    Category::ValueProposition,
    Category::Uniqueness,
    Category::ProductService,
    Category::Communication,
    Category::InnerBranding,
    Category::KpiManagement,
    Category::Results,
    Category::IpProtection,
    Category::GrowthIntent,
];

impl Category {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MarketUnderstanding => "市場理解",
            Self::CompetitiveAnalysis => "競合分析",
            Self::SelfAnalysis => "自社分析",
            Self::ValueProposition => "価値提案",
            Self::Uniqueness => "独自性",
            Self::ProductService => "製品・サービス",
            Self::Communication => "コミュニケーション",
            Self::InnerBranding => "インナーブランディング",
            Self::KpiManagement => "KPI管理",
            Self::Results => "成果",
            Self::IpProtection => "知財保護",
            Self::GrowthIntent => "成長意欲",
        }
    }

    /// Column key used by the persisted survey row.
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::MarketUnderstanding => "q1_market_understanding",
            Self::CompetitiveAnalysis => "q2_competitive_analysis",
            Self::SelfAnalysis => "q3_self_analysis",
            Self::ValueProposition => "q4_value_proposition",
            Self::Uniqueness => "q5_uniqueness",
            Self::ProductService => "q6_product_service",
            Self::Communication => "q7_communication",
            Self::InnerBranding => "q8_inner_branding",
            Self::KpiManagement => "q9_kpi_management",
            Self::Results => "q10_results",
            Self::IpProtection => "q11_ip_protection",
            Self::GrowthIntent => "q12_growth_intent",
        }
    }

    /// Statement the respondent rates from 1 to 5.
    pub const fn description(self) -> &'static str {
        match self {
            Self::MarketUnderstanding => {
                "自社の「理想的な顧客像（ターゲット）」が明確で、社内でも共有されている。"
            }
            Self::CompetitiveAnalysis => "主な競合と自社の違いを、言語化して説明できる。",
            Self::SelfAnalysis => "自社の強み・弱みを、第三者に説明できるレベルで把握している。",
            Self::ValueProposition => {
                "自社が「誰に」「どんな価値を」「なぜ提供できるのか」が明文化されている。"
            }
            Self::Uniqueness => "競合が真似できない「独自の意味」や「世界観」がある。",
            Self::ProductService => "提供する商品・サービスが、ブランドの理念と整合している。",
            Self::Communication => {
                "ブランドのメッセージが、Web・営業・採用など全てで一貫している。"
            }
            Self::InnerBranding => "社員が自社のブランド価値を理解し、日常業務で体現している。",
            Self::KpiManagement => {
                "ブランドに関する目標（KPI）や指標を定期的にモニタリングしている。"
            }
            Self::Results => {
                "ブランド施策によって、売上・採用・顧客満足度などに変化が出ている。"
            }
            Self::IpProtection => {
                "ブランド名・ロゴ・デザインなど、法的保護（商標・特許）を意識している。"
            }
            Self::GrowthIntent => "自社のブランドを資産として成長させたいという意思がある。",
        }
    }

    /// First category, in table order, whose label occurs in `text`.
    pub fn first_mentioned_in(text: &str) -> Option<Self> {
        CATEGORIES
            .iter()
            .copied()
            .find(|category| text.contains(category.label()))
    }
}

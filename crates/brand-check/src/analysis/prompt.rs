use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::report::ReportSchema;
use crate::assessment::{ScoreSet, ValidationError};

const MISSING_TEXT: &str = "未入力";
const MISSING_MEMO: &str = "記載なし";

/// Everything the model needs to analyse one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub scores: ScoreSet,
    #[serde(default)]
    pub memo: Option<String>,
    #[serde(default)]
    pub business_phase: String,
    #[serde(default)]
    pub company_name: Option<String>,
}

impl ReportRequest {
    /// Validate raw scores and assemble a request.
    pub fn new(
        raw_scores: &[i64],
        memo: Option<String>,
        business_phase: impl Into<String>,
        company_name: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            scores: ScoreSet::new(raw_scores)?,
            memo,
            business_phase: business_phase.into(),
            company_name,
        })
    }
}

/// Renders the analysis instructions for the configured report schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    schema: ReportSchema,
}

impl PromptBuilder {
    pub fn new(schema: ReportSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> ReportSchema {
        self.schema
    }

    pub fn build(&self, request: &ReportRequest) -> String {
        let company = non_blank(request.company_name.as_deref()).unwrap_or(MISSING_TEXT);
        let phase = non_blank(Some(request.business_phase.as_str())).unwrap_or(MISSING_TEXT);
        let memo = non_blank(request.memo.as_deref()).unwrap_or(MISSING_MEMO);

        let mut prompt = String::new();
        prompt.push_str(
            "あなたはブランディングの専門家です。以下の企業のブランドチェック診断結果を分析してください。\n\n",
        );
        let _ = writeln!(prompt, "【企業情報】");
        let _ = writeln!(prompt, "会社名: {company}");
        let _ = writeln!(prompt, "ビジネスフェーズ: {phase}\n");
        let _ = writeln!(prompt, "【診断スコア（5点満点）】");
        prompt.push_str(&score_lines(&request.scores));
        let _ = writeln!(prompt, "平均スコア: {}点\n", request.scores.average_display());
        let _ = writeln!(prompt, "【経営者のメモ（課題・展望）】");
        let _ = writeln!(prompt, "{memo}\n");
        prompt.push_str("---\n\n");
        prompt.push_str(
            "以下の項目について、丁寧かつ具体的に分析してください。ですます調を使用し、配慮のある表現を心がけてください：\n\n",
        );

        match self.schema {
            ReportSchema::V1 => push_legacy_sections(&mut prompt, phase),
            ReportSchema::V2 => push_prioritized_sections(&mut prompt, phase),
        }

        prompt.push_str(TONE_RULES);
        prompt.push_str("\n必ず以下のJSON形式で出力してください：\n```json\n");
        prompt.push_str(match self.schema {
            ReportSchema::V1 => LEGACY_SHAPE,
            ReportSchema::V2 => PRIORITIZED_SHAPE,
        });
        prompt.push_str("\n```");
        prompt
    }
}

/// `label: N点` per category, in table order.
pub fn score_lines(scores: &ScoreSet) -> String {
    scores.pairs().fold(String::new(), |mut lines, (category, score)| {
        let _ = writeln!(lines, "{}: {}点", category.label(), score);
        lines
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

fn push_legacy_sections(prompt: &mut String, phase: &str) {
    prompt.push_str(
        "1. **総合評価**: 平均スコアと全体的な状況を4-5文で評価します。メモの内容も十分に考慮し、現状の強みと今後の可能性について触れてください。\n\n\
2. **矛盾検知**: スコア間の矛盾、またはスコアとメモの矛盾を4-6個丁寧に指摘します。\n\
   表現例：「〜は高評価である一方で、〜は低い点が気になります」\n\n\
3. **優先アクション（緊急度順）**: 最も優先度の高いアクションを4-5個提案します。「〜することをお勧めします」といった丁寧な表現を使ってください。\n\n\
4. **改善が必要な領域**: スコアが3点以下の項目について、改善の余地と具体的な方向性を3-4個提示します。\n\n\
5. **具体的な改善提案**: 実行可能な具体的アクションを6-8個提案します。\n\n\
6. **リスク分析**: 現状のまま進んだ場合に想定されるリスクを4-5個提示します。\n\n",
    );
    push_action_plan_sections(prompt, 7);
    let _ = writeln!(
        prompt,
        "10. **事業フェーズ別アドバイス**: {phase}フェーズに特化したアドバイスを3-4文で提供します。このフェーズならではの重要なポイントを、前向きかつ具体的に示してください。\n"
    );
}

fn push_prioritized_sections(prompt: &mut String, phase: &str) {
    prompt.push_str(
        "1. **総合評価**: 平均スコアと全体的な状況を4-5文で評価します。メモの内容も十分に考慮し、現状の強みと今後の可能性について触れてください。\n\n\
2. **矛盾とリスク**: スコア間やスコアとメモの矛盾、および現状のまま進んだ場合のリスクを合わせて5-7個指摘します。\n\n\
3. **改善提案**: スコアの低い項目を中心に、実行可能な改善提案を6-8個示します。各提案の冒頭には対象となる診断項目名（例：「市場理解」「KPI管理」）を必ず含めてください。\n\n",
    );
    push_action_plan_sections(prompt, 4);
    let _ = writeln!(
        prompt,
        "7. **事業フェーズ別アドバイス**: {phase}フェーズに特化したアドバイスを3-4文で提供します。このフェーズならではの重要なポイントを、前向きかつ具体的に示してください。\n"
    );
}

fn push_action_plan_sections(prompt: &mut String, first: u8) {
    let plans = [
        ("3ヶ月後のアクションプラン", "今から3ヶ月"),
        ("6ヶ月後のアクションプラン", "3-6ヶ月の期間"),
        ("1年後のアクションプラン", "6ヶ月-1年の期間"),
    ];
    for (offset, (title, window)) in (0u8..).zip(plans) {
        let _ = writeln!(
            prompt,
            "{}. **{title}**: {window}で取り組むべき具体的なアクションを3-4個提案します。\n",
            first + offset
        );
    }
}

const TONE_RULES: &str = "重要な注意事項：
- メモの内容を丁寧に読み取り、経営者の想いや課題認識を尊重した分析を行うこと
- 矛盾点を指摘する際も、「〜の可能性があります」「〜と考えられます」といった配慮ある表現を使うこと
- 断定的な表現を避け、「〜することをお勧めします」といった提案型の表現を使うこと
- すべての文章をですます調で統一すること
- ポジティブな面も認めながら、建設的な改善提案を行うこと
";

const LEGACY_SHAPE: &str = r#"{
  "overallComment": "総合評価の文章",
  "contradictions": ["矛盾1", "矛盾2", "矛盾3", "矛盾4"],
  "priorityActions": ["アクション1", "アクション2", "アクション3", "アクション4"],
  "weaknesses": ["弱み1", "弱み2", "弱み3"],
  "recommendations": ["提案1", "提案2", "提案3", "提案4", "提案5", "提案6"],
  "risks": ["リスク1", "リスク2", "リスク3", "リスク4"],
  "actionPlan3Months": ["3ヶ月後アクション1", "3ヶ月後アクション2", "3ヶ月後アクション3"],
  "actionPlan6Months": ["6ヶ月後アクション1", "6ヶ月後アクション2", "6ヶ月後アクション3"],
  "actionPlan1Year": ["1年後アクション1", "1年後アクション2", "1年後アクション3"],
  "phaseAdvice": "事業フェーズ別アドバイスの文章"
}"#;

const PRIORITIZED_SHAPE: &str = r#"{
  "overallComment": "総合評価の文章",
  "contradictionsAndRisks": ["指摘1", "指摘2", "指摘3", "指摘4", "指摘5"],
  "improvements": ["項目名: 改善提案1", "項目名: 改善提案2", "項目名: 改善提案3", "項目名: 改善提案4", "項目名: 改善提案5", "項目名: 改善提案6"],
  "actionPlan3Months": ["3ヶ月後アクション1", "3ヶ月後アクション2", "3ヶ月後アクション3"],
  "actionPlan6Months": ["6ヶ月後アクション1", "6ヶ月後アクション2", "6ヶ月後アクション3"],
  "actionPlan1Year": ["1年後アクション1", "1年後アクション2", "1年後アクション3"],
  "phaseAdvice": "事業フェーズ別アドバイスの文章"
}"#;

//! Built-in default questions so the app is useful without any imported
//! bank. Content targets the verb "voir" across the common tenses.

use crate::domain::{AnswerKey, Question, QuestionKind};

fn q(
  kind: QuestionKind,
  stem: &str,
  options: &[&str],
  key: AnswerKey,
  explanation: &str,
  category: &str,
) -> Question {
  Question {
    kind,
    stem: stem.into(),
    options: options.iter().map(|s| s.to_string()).collect(),
    key,
    explanation: Some(explanation.into()),
    category: Some(category.into()),
  }
}

/// Default question bank covering all four kinds.
pub fn default_questions() -> Vec<Question> {
  vec![
    q(
      QuestionKind::SingleChoice,
      "En ce moment, nous ______ un film intéressant.",
      &["voions", "voyons", "voyez", "voient"],
      AnswerKey::Single(1),
      "【A2 拼写陷阱】Nous/Vous 变位时，词根 i 必须变为 y。Nous voyons 是唯一正确形式。",
      "直陈式现在时",
    ),
    q(
      QuestionKind::SingleChoice,
      "Les fleurs ? Oui, je les ai ______.",
      &["vu", "vue", "vus", "vues"],
      AnswerKey::Single(3),
      "【B2 过去分词配合】les 指代 les fleurs (阴性复数)，且放在助动词 ai 之前，vu 必须配合为 vues。",
      "复合过去时",
    ),
    q(
      QuestionKind::SingleChoice,
      "Demain, je ______ le médecin.",
      &["vais voir", "vais vois", "va voir", "aller voir"],
      AnswerKey::Single(0),
      "【A1 最近将来时】结构：Aller (变位) + 动词原形。Je vais + voir。",
      "最近将来时",
    ),
    q(
      QuestionKind::MultipleChoice,
      "下列哪些句子的变位形式在发音上完全相同（TCF 听力同音陷阱）？",
      &["Je vois", "Tu vois", "Il voit", "Ils voient"],
      AnswerKey::Multiple(vec![0, 1, 2, 3]),
      "【A1 语音辨析】vois, voit, voient 发音均为 /vwa/，只有主语能区分它们。",
      "直陈式现在时",
    ),
    q(
      QuestionKind::MultipleChoice,
      "关于复合过去时 'J'ai vu'，下列哪些说法是正确的？",
      &["助动词是 être", "助动词是 avoir", "过去分词是 vu", "过去分词是 voiré"],
      AnswerKey::Multiple(vec![1, 2]),
      "【A1 基础构成】Voir 的复合过去时由 Avoir + Vu 构成。",
      "复合过去时",
    ),
    q(
      QuestionKind::FillBlank,
      "C'est la lettre que j'ai ______ (voir).",
      &[],
      AnswerKey::Text(vec!["vue".into()]),
      "【B2 配合】Que 指代 la lettre (阴性单数)，且在动词前，vu 需变成 vue。",
      "复合过去时",
    ),
    q(
      QuestionKind::FillBlank,
      "Nous ______ (voir) que tu es fatigué.",
      &[],
      AnswerKey::Text(vec!["voyons".into()]),
      "【A2 拼写】Nous + voir = voyons (注意 y)。",
      "直陈式现在时",
    ),
    q(
      QuestionKind::ParagraphFillBlank,
      "Hier, j'ai _____ un accident. Aujourd'hui, je _____ que la police est là.",
      &[],
      AnswerKey::Text(vec!["vu".into(), "vois".into()]),
      "【时态对比】第一空 Hier 触发复合过去时 (ai vu)；第二空 Aujourd'hui 触发现在时 (vois)。",
      "时态综合",
    ),
    q(
      QuestionKind::ParagraphFillBlank,
      "Tu _____ voir ce film demain ? Non, je l'ai déjà _____.",
      &[],
      AnswerKey::Text(vec!["vas".into(), "vu".into()]),
      "【语境辨析】第一空 Demain 触发最近将来时 (vas voir)；第二空 déjà 触发复合过去时，le 指代 film (阳性)，vu 不变。",
      "时态综合",
    ),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_seed_validates() {
    for q in default_questions() {
      assert!(q.validate().is_ok(), "invalid seed: {}", q.stem);
    }
  }

  #[test]
  fn seeds_cover_all_kinds() {
    let seeds = default_questions();
    for kind in [
      QuestionKind::SingleChoice,
      QuestionKind::MultipleChoice,
      QuestionKind::FillBlank,
      QuestionKind::ParagraphFillBlank,
    ] {
      assert!(seeds.iter().any(|q| q.kind == kind));
    }
  }

  #[test]
  fn seed_fingerprints_are_unique() {
    let seeds = default_questions();
    let mut fps: Vec<String> = seeds.iter().map(|q| q.fingerprint()).collect();
    fps.sort();
    fps.dedup();
    assert_eq!(fps.len(), seeds.len());
  }
}

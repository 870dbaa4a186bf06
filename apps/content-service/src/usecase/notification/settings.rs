//! # 通知設定
//!
//! テンプレートレンダリングに必要な、リクエストに依存しない値をまとめる。

/// 通知メールの共通設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// 送信元（例: `Dr. Sayuj Krishnan <hellodr@drsayuj.info>`）
    pub from_address:    String,
    /// 管理者宛て通知の宛先（緊急アラート、コンバージョン、お問い合わせ）
    pub admin_addresses: Vec<String>,
    /// サイトの URL（メール内リンク用、末尾スラッシュなし）
    pub site_url:        String,
    /// レビュー投稿ページの URL（フィードバック依頼用）
    pub review_url:      String,
}

impl NotificationSettings {
    pub fn new(
        from_address: impl Into<String>,
        admin_addresses: Vec<String>,
        site_url: impl Into<String>,
        review_url: impl Into<String>,
    ) -> Self {
        Self {
            from_address: from_address.into(),
            admin_addresses,
            site_url: site_url.into().trim_end_matches('/').to_string(),
            review_url: review_url.into(),
        }
    }

    /// 送信元の表示名を除いたメールアドレス
    ///
    /// `Name <addr@example.com>` 形式なら山括弧の中身、それ以外は全体を返す。
    pub fn from_mailbox(&self) -> &str {
        let from = self.from_address.trim();
        match (from.rfind('<'), from.rfind('>')) {
            (Some(start), Some(end)) if start < end => &from[start + 1..end],
            _ => from,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn 表示名付きの送信元からアドレスを取り出す() {
        let settings = NotificationSettings::new(
            "Dr. Sayuj Krishnan <hellodr@drsayuj.info>",
            vec![],
            "https://www.drsayuj.info/",
            "https://g.page/r/drsayuj-hyderabad/review",
        );

        assert_eq!(settings.from_mailbox(), "hellodr@drsayuj.info");
        assert_eq!(settings.site_url, "https://www.drsayuj.info");
    }

    #[test]
    fn 表示名なしの送信元はそのまま返す() {
        let settings = NotificationSettings::new(
            "hellodr@drsayuj.info",
            vec![],
            "https://www.drsayuj.info",
            "https://g.page/r/drsayuj-hyderabad/review",
        );

        assert_eq!(settings.from_mailbox(), "hellodr@drsayuj.info");
    }
}

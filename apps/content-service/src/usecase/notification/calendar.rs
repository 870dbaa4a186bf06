//! # カレンダー招待（iCalendar）
//!
//! 予約 1 件を RFC 5545 の `VCALENDAR` として出力する。
//!
//! - 日時はすべて UTC（`YYYYMMDDTHHMMSSZ`）で出力する
//! - 行末は CRLF、75 オクテットを超える行は折り返す
//! - TEXT 値のバックスラッシュ・セミコロン・カンマ・改行はエスケープする

use chrono::{DateTime, TimeDelta, Utc};
use neurosite_domain::notification::{CalendarInvite, EmailAttachment};

/// 添付ファイル名
pub const ICS_FILENAME: &str = "appointment.ics";

/// 添付ファイルの Content-Type
pub const ICS_CONTENT_TYPE: &str = "text/calendar";

/// 診察場所
pub const CLINIC_LOCATION: &str =
    "Yashoda Hospital, Room No 317, OPD Block, Malakpet, Hyderabad - 500036";

const MAX_LINE_OCTETS: usize = 75;

/// 予約のカレンダー招待を生成する
///
/// # 引数
///
/// - `uid`: イベントの一意識別子（呼び出しごとに新規発行する）
/// - `organizer`: 主催者のメールアドレス（表示名なし）
/// - `now`: `DTSTAMP` に使う現在時刻
pub fn build_ics(
    invite: &CalendarInvite,
    uid: &str,
    organizer: &str,
    now: DateTime<Utc>,
) -> String {
    let end = invite.appointment_at + TimeDelta::minutes(i64::from(invite.duration_minutes));
    let summary = format!("{} - Dr. Sayuj Krishnan", invite.appointment_type);
    let description = format!(
        "Appointment for {} with Dr. Sayuj Krishnan. Please arrive 15 minutes early and bring your previous reports.",
        invite.recipient_name
    );

    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Dr. Sayuj Krishnan//Appointments//EN".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:REQUEST".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{uid}"),
        format!("DTSTAMP:{}", ics_timestamp(now)),
        format!("DTSTART:{}", ics_timestamp(invite.appointment_at)),
        format!("DTEND:{}", ics_timestamp(end)),
        format!("SUMMARY:{}", escape_text(&summary)),
        format!("LOCATION:{}", escape_text(CLINIC_LOCATION)),
        format!("DESCRIPTION:{}", escape_text(&description)),
        format!("ORGANIZER;CN=\"Dr. Sayuj Krishnan\":mailto:{organizer}"),
        format!(
            "ATTENDEE;CN=\"{}\";RSVP=TRUE:mailto:{}",
            invite.recipient_name.replace('"', ""),
            invite.recipient_email
        ),
        "STATUS:CONFIRMED".to_string(),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];

    let mut ics = String::new();
    for line in &lines {
        ics.push_str(&fold_line(line));
        ics.push_str("\r\n");
    }
    ics
}

/// カレンダー招待をメール添付ファイルに変換する
pub fn ics_attachment(ics: String) -> EmailAttachment {
    EmailAttachment {
        filename:     ICS_FILENAME.to_string(),
        content_type: ICS_CONTENT_TYPE.to_string(),
        content:      ics.into_bytes(),
    }
}

fn ics_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// 75 オクテットごとに `CRLF + 空白` で折り返す（マルチバイト文字は分割しない）
fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len());
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            // 継続行の先頭空白も 1 オクテットに数える
            width = 1;
        }
        folded.push(ch);
        width += len;
    }
    folded
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_invite() -> CalendarInvite {
        CalendarInvite {
            recipient_email:  "pat@example.com".to_string(),
            recipient_name:   "Asha Rao".to_string(),
            // 2025-10-20 10:30 IST
            appointment_at:   Utc.with_ymd_and_hms(2025, 10, 20, 5, 0, 0).unwrap(),
            appointment_type: "Consultation".to_string(),
            duration_minutes: 45,
        }
    }

    fn make_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 8, 15, 0).unwrap()
    }

    #[test]
    fn イベントの日時をutcで出力する() {
        let ics = build_ics(&make_invite(), "uid-1@drsayuj.info", "hellodr@drsayuj.info", make_now());

        assert!(ics.contains("\r\nUID:uid-1@drsayuj.info\r\n"));
        assert!(ics.contains("\r\nDTSTAMP:20251001T081500Z\r\n"));
        assert!(ics.contains("\r\nDTSTART:20251020T050000Z\r\n"));
        assert!(ics.contains("\r\nDTEND:20251020T054500Z\r\n"));
    }

    #[test]
    fn vcalendarで始まりcrlfで終わる() {
        let ics = build_ics(&make_invite(), "uid-1", "hellodr@drsayuj.info", make_now());

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(!ics.replace("\r\n", "").contains('\n'));
    }

    #[test]
    fn text値の区切り文字をエスケープする() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
    }

    #[test]
    fn 場所のカンマはエスケープされる() {
        let ics = build_ics(&make_invite(), "uid-1", "hellodr@drsayuj.info", make_now());

        assert!(ics.contains("LOCATION:Yashoda Hospital\\, Room No 317"));
    }

    #[test]
    fn 長い行は75オクテットで折り返す() {
        let line = "DESCRIPTION:".to_string() + &"x".repeat(100);

        let folded = fold_line(&line);
        let physical: Vec<&str> = folded.split("\r\n").collect();

        assert_eq!(physical.len(), 2);
        assert_eq!(physical[0].len(), 75);
        assert!(physical[1].starts_with(' '));
        assert_eq!(folded.replace("\r\n ", ""), line);
    }

    #[test]
    fn マルチバイト文字を分割しない() {
        let line = "SUMMARY:".to_string() + &"あ".repeat(40);

        let folded = fold_line(&line);

        for physical in folded.split("\r\n") {
            assert!(physical.len() <= MAX_LINE_OCTETS);
        }
        assert_eq!(folded.replace("\r\n ", ""), line);
    }

    #[test]
    fn 添付ファイルのメタデータ() {
        let attachment = ics_attachment("BEGIN:VCALENDAR\r\n".to_string());

        assert_eq!(attachment.filename, "appointment.ics");
        assert_eq!(attachment.content_type, "text/calendar");
        assert_eq!(attachment.content, b"BEGIN:VCALENDAR\r\n");
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// 查詢的日期，只有今天與明天兩種
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Day {
    #[default]
    Today,
    Tomorrow,
}

impl Day {
    pub fn as_str(&self) -> &'static str {
        match self {
            Day::Today => "today",
            Day::Tomorrow => "tomorrow",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Day::Today => Day::Tomorrow,
            Day::Tomorrow => Day::Today,
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次抓取所用的篩選條件，觸發時建立，之後不再變動
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceQuery {
    pub day: Day,
    pub regions: Vec<String>,
}

impl RaceQuery {
    pub fn new(day: Day, regions: Vec<String>) -> Self {
        Self { day, regions }
    }

    /// 送出時的查詢參數，region_codes 每個地區一組
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(1 + self.regions.len());
        params.push(("day", self.day.as_str()));
        for region in &self.regions {
            params.push(("region_codes", region.as_str()));
        }
        params
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// 環境變數名稱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialVars {
    pub username: String,
    pub password: String,
}

impl Default for CredentialVars {
    fn default() -> Self {
        Self {
            username: "RACING_API_USERNAME".to_string(),
            password: "RACING_API_PASSWORD".to_string(),
        }
    }
}

/// 畫面上顯示的欄位文字；None 表示欄位不存在
pub type Field = Option<String>;

/// 將任意 JSON 值轉成顯示文字，null 視為不存在
pub fn display_text(value: &Value) -> Field {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// 與 truthiness 相同的判斷：空字串、0、false、空容器都不顯示
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn present_text(value: &Option<Value>) -> Field {
    value.as_ref().filter(|v| !is_blank(v)).and_then(display_text)
}

fn cell_text(value: &Option<Value>) -> Field {
    value.as_ref().and_then(display_text)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMeeting {
    course: Option<Value>,
    region: Option<Value>,
    off_time: Option<Value>,
    off_dt: Option<Value>,
    going: Option<Value>,
    race_name: Option<Value>,
    race_class: Option<Value>,
    #[serde(rename = "type")]
    race_type: Option<Value>,
    field_size: Option<Value>,
    prize: Option<Value>,
    distance_f: Option<Value>,
    surface: Option<Value>,
    age_band: Option<Value>,
    rating_band: Option<Value>,
    runners: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRunner {
    number: Option<Value>,
    draw: Option<Value>,
    horse: Option<Value>,
    age: Option<Value>,
    sex_code: Option<Value>,
    sex: Option<Value>,
    trainer: Option<Value>,
    jockey: Option<Value>,
    headgear: Option<Value>,
    ofr: Option<Value>,
    lbs: Option<Value>,
    last_run: Option<Value>,
    form: Option<Value>,
}

/// 一場賽事（meeting）的卡片資料，所有欄位都可能缺少
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meeting {
    pub course: Field,
    pub region: Field,
    pub start_time: Field,
    pub going: Field,
    pub race_name: Field,
    pub race_class: Field,
    pub race_type: Field,
    pub field_size: Field,
    pub prize: Field,
    pub distance_f: Field,
    pub surface: Field,
    pub age_band: Field,
    pub rating_band: Field,
    pub runners: Vec<Runner>,
}

impl Meeting {
    /// 寬鬆解析：不是物件或欄位型別不符時一律退回預設值，不會失敗
    pub fn from_value(value: &Value) -> Self {
        let raw: RawMeeting = match value {
            Value::Object(_) => RawMeeting::deserialize(value).unwrap_or_default(),
            _ => RawMeeting::default(),
        };

        let runners = match &raw.runners {
            Some(Value::Array(items)) => items.iter().filter_map(Runner::from_value).collect(),
            _ => Vec::new(),
        };

        Self {
            course: cell_text(&raw.course),
            region: present_text(&raw.region),
            start_time: present_text(&raw.off_time).or_else(|| present_text(&raw.off_dt)),
            going: present_text(&raw.going),
            race_name: present_text(&raw.race_name),
            race_class: present_text(&raw.race_class),
            race_type: present_text(&raw.race_type),
            field_size: present_text(&raw.field_size),
            prize: present_text(&raw.prize),
            distance_f: present_text(&raw.distance_f),
            surface: present_text(&raw.surface),
            age_band: present_text(&raw.age_band),
            rating_band: present_text(&raw.rating_band),
            runners,
        }
    }
}

/// 出賽馬匹
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Runner {
    pub number: Field,
    pub draw: Field,
    pub horse: Field,
    pub age: Field,
    pub sex: Field,
    pub trainer: Field,
    pub jockey: Field,
    pub headgear: Field,
    pub official_rating: Field,
    pub lbs: Field,
    pub last_run: Field,
    pub form: Field,
}

impl Runner {
    /// 非物件的項目回傳 None，表格中略過
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        let raw = RawRunner::deserialize(value).unwrap_or_default();

        Some(Self {
            number: cell_text(&raw.number),
            draw: cell_text(&raw.draw),
            horse: cell_text(&raw.horse),
            age: cell_text(&raw.age),
            sex: if raw.sex_code.is_some() {
                cell_text(&raw.sex_code)
            } else {
                cell_text(&raw.sex)
            },
            trainer: cell_text(&raw.trainer),
            jockey: cell_text(&raw.jockey),
            headgear: cell_text(&raw.headgear),
            official_rating: cell_text(&raw.ofr),
            lbs: cell_text(&raw.lbs),
            last_run: cell_text(&raw.last_run),
            form: cell_text(&raw.form),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// API 沒有回傳任何內容（null 或空 body）
    NothingReturned,
    /// 回傳了，但內容是空的（[]、""、0、false）
    EmptyPayload,
}

/// 抓取後只判斷一次的呈現方式
#[derive(Debug, Clone, PartialEq)]
pub enum RacecardsView {
    Cards(Vec<Meeting>),
    Raw(Value),
    Empty(EmptyReason),
}

impl RacecardsView {
    pub fn from_json(value: &Value) -> Self {
        if value.is_null() {
            return RacecardsView::Empty(EmptyReason::NothingReturned);
        }
        // 空物件仍視為非預期的格式，直接顯示原始 JSON
        if is_blank(value) && !value.is_object() {
            return RacecardsView::Empty(EmptyReason::EmptyPayload);
        }

        match value.get("racecards") {
            Some(Value::Array(items)) => {
                RacecardsView::Cards(items.iter().map(Meeting::from_value).collect())
            }
            _ => RacecardsView::Raw(value.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params_keep_order() {
        let query = RaceQuery::new(Day::Tomorrow, vec!["ire".to_string(), "gb".to_string()]);
        assert_eq!(
            query.params(),
            vec![
                ("day", "tomorrow"),
                ("region_codes", "ire"),
                ("region_codes", "gb")
            ]
        );
    }

    #[test]
    fn test_query_params_without_regions() {
        let query = RaceQuery::new(Day::Today, vec![]);
        assert_eq!(query.params(), vec![("day", "today")]);
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            username: "racer".to_string(),
            password: "s3cret".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("racer"));
        assert!(!debug.contains("s3cret"));
    }

    #[test]
    fn test_display_text_coercion() {
        assert_eq!(display_text(&json!("Ascot")), Some("Ascot".to_string()));
        assert_eq!(display_text(&json!(7)), Some("7".to_string()));
        assert_eq!(display_text(&json!(1.5)), Some("1.5".to_string()));
        assert_eq!(display_text(&json!(true)), Some("true".to_string()));
        assert_eq!(display_text(&json!(["p", "t"])), Some(r#"["p","t"]"#.to_string()));
        assert_eq!(display_text(&Value::Null), None);
    }

    #[test]
    fn test_meeting_with_no_fields() {
        let meeting = Meeting::from_value(&json!({}));
        assert_eq!(meeting, Meeting::default());
    }

    #[test]
    fn test_meeting_non_object_defaults() {
        assert_eq!(Meeting::from_value(&json!("oops")), Meeting::default());
        assert_eq!(Meeting::from_value(&json!(42)), Meeting::default());
    }

    #[test]
    fn test_meeting_off_time_falls_back_to_off_dt() {
        let meeting = Meeting::from_value(&json!({
            "off_time": "",
            "off_dt": "2026-10-16T14:00:00+01:00"
        }));
        assert_eq!(
            meeting.start_time.as_deref(),
            Some("2026-10-16T14:00:00+01:00")
        );
    }

    #[test]
    fn test_meeting_blank_caption_fields_are_absent() {
        let meeting = Meeting::from_value(&json!({
            "field_size": 0,
            "prize": "",
            "going": null,
            "distance_f": 8.0
        }));
        assert_eq!(meeting.field_size, None);
        assert_eq!(meeting.prize, None);
        assert_eq!(meeting.going, None);
        assert_eq!(meeting.distance_f.as_deref(), Some("8.0"));
    }

    #[test]
    fn test_runner_keeps_zero_values() {
        let runner = Runner::from_value(&json!({"draw": 0, "horse": "Dobbin"})).unwrap();
        assert_eq!(runner.draw.as_deref(), Some("0"));
        assert_eq!(runner.horse.as_deref(), Some("Dobbin"));
        assert_eq!(runner.jockey, None);
    }

    #[test]
    fn test_runner_sex_falls_back() {
        let runner = Runner::from_value(&json!({"sex": "gelding"})).unwrap();
        assert_eq!(runner.sex.as_deref(), Some("gelding"));

        let runner = Runner::from_value(&json!({"sex_code": "G", "sex": "gelding"})).unwrap();
        assert_eq!(runner.sex.as_deref(), Some("G"));
    }

    #[test]
    fn test_non_object_runners_are_skipped() {
        let meeting = Meeting::from_value(&json!({
            "runners": [{"horse": "A"}, "junk", null, {"horse": "B"}]
        }));
        assert_eq!(meeting.runners.len(), 2);
        assert_eq!(meeting.runners[1].horse.as_deref(), Some("B"));
    }

    #[test]
    fn test_view_from_json_shapes() {
        assert_eq!(
            RacecardsView::from_json(&Value::Null),
            RacecardsView::Empty(EmptyReason::NothingReturned)
        );
        assert_eq!(
            RacecardsView::from_json(&json!([])),
            RacecardsView::Empty(EmptyReason::EmptyPayload)
        );
        assert_eq!(
            RacecardsView::from_json(&json!({})),
            RacecardsView::Raw(json!({}))
        );
        assert_eq!(
            RacecardsView::from_json(&json!({"racecards": "nope"})),
            RacecardsView::Raw(json!({"racecards": "nope"}))
        );
        assert_eq!(
            RacecardsView::from_json(&json!({"racecards": []})),
            RacecardsView::Cards(vec![])
        );
    }

    #[test]
    fn test_view_keeps_one_meeting_per_element_in_order() {
        let value = json!({"racecards": [
            {"course": "Ascot"},
            {"course": "Leopardstown"},
            7,
            {"course": "Ascot"}
        ]});
        let RacecardsView::Cards(meetings) = RacecardsView::from_json(&value) else {
            panic!("expected cards");
        };
        let courses: Vec<Option<&str>> = meetings.iter().map(|m| m.course.as_deref()).collect();
        assert_eq!(
            courses,
            vec![Some("Ascot"), Some("Leopardstown"), None, Some("Ascot")]
        );
    }
}

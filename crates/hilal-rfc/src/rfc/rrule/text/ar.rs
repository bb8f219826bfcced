use hilal_core::{SkipPolicy, Weekday};

use super::join_list;
use crate::rfc::rrule::core::{Frequency, NormalizedRule, WeekdayNum};

const MONTHS: [&str; 12] = [
    "محرم",
    "صفر",
    "ربيع الأول",
    "ربيع الآخر",
    "جمادى الأولى",
    "جمادى الآخرة",
    "رجب",
    "شعبان",
    "رمضان",
    "شوال",
    "ذو القعدة",
    "ذو الحجة",
];

/// Day name with and without the article (`الجمعة`, `جمعة`).
const fn weekday_names(weekday: Weekday) -> (&'static str, &'static str) {
    match weekday {
        Weekday::Sunday => ("الأحد", "أحد"),
        Weekday::Monday => ("الاثنين", "اثنين"),
        Weekday::Tuesday => ("الثلاثاء", "ثلاثاء"),
        Weekday::Wednesday => ("الأربعاء", "أربعاء"),
        Weekday::Thursday => ("الخميس", "خميس"),
        Weekday::Friday => ("الجمعة", "جمعة"),
        Weekday::Saturday => ("السبت", "سبت"),
    }
}

const fn unit(freq: Frequency) -> (&'static str, &'static str) {
    match freq {
        Frequency::Yearly => ("سنة", "سنوات"),
        Frequency::Monthly => ("شهر", "أشهر"),
        Frequency::Weekly => ("أسبوع", "أسابيع"),
        Frequency::Daily => ("يوم", "أيام"),
        Frequency::Hourly => ("ساعة", "ساعات"),
        Frequency::Minutely => ("دقيقة", "دقائق"),
        Frequency::Secondly => ("ثانية", "ثوان"),
    }
}

fn ordinal_word(n: u32) -> String {
    match n {
        1 => "أول".to_string(),
        2 => "ثاني".to_string(),
        3 => "ثالث".to_string(),
        4 => "رابع".to_string(),
        5 => "خامس".to_string(),
        _ => format!("رقم {n}"),
    }
}

fn join(items: &[String]) -> String {
    join_list(items, "، ", " و")
}

fn month_day(day: i64) -> String {
    match day {
        -1 => "آخر يوم".to_string(),
        d if d < 0 => format!("اليوم {} من آخر الشهر", d.unsigned_abs()),
        d => format!("اليوم {d}"),
    }
}

fn weekday(value: &WeekdayNum) -> String {
    let (definite, bare) = weekday_names(value.weekday);
    match value.ordinal {
        None => format!("يوم {definite}"),
        Some(-1) => format!("آخر {bare}"),
        Some(n) if n > 0 => format!("{} {bare}", ordinal_word(u32::from(n.unsigned_abs()))),
        Some(n) => format!(
            "{} {bare} من آخر الشهر",
            ordinal_word(u32::from(n.unsigned_abs()))
        ),
    }
}

fn numbers<T: ToString>(values: &[T]) -> String {
    let items: Vec<_> = values.iter().map(ToString::to_string).collect();
    join(&items)
}

pub(super) fn render(rule: &NormalizedRule) -> String {
    let (one, many) = unit(rule.freq);
    let mut out = if rule.interval == 1 {
        format!("كل {one}")
    } else {
        format!("كل {} {many}", rule.interval)
    };

    if let Some(ref months) = rule.by_month {
        let names: Vec<_> = months
            .iter()
            .filter_map(|&m| MONTHS.get(usize::from(m).wrapping_sub(1)))
            .map(ToString::to_string)
            .collect();
        out.push_str(" في ");
        out.push_str(&join(&names));
    }

    let mut days: Vec<_> = rule.month_days().into_iter().map(month_day).collect();
    days.extend(rule.weekdays().iter().map(weekday));
    if !days.is_empty() {
        out.push_str("، ");
        out.push_str(&join(&days));
    }

    if let Some(ref year_days) = rule.by_year_day {
        out.push_str(&format!("، اليوم {} من السنة", numbers(year_days)));
    }
    if let Some(ref weeks) = rule.by_week_no {
        out.push_str(&format!("، الأسبوع {}", numbers(weeks)));
    }
    if let Some(ref hours) = rule.by_hour {
        out.push_str(&format!("، الساعة {}", numbers(hours)));
    }
    if let Some(ref minutes) = rule.by_minute {
        out.push_str(&format!("، الدقيقة {}", numbers(minutes)));
    }
    if let Some(ref seconds) = rule.by_second {
        out.push_str(&format!("، الثانية {}", numbers(seconds)));
    }
    if let Some(ref positions) = rule.by_set_pos {
        out.push_str(&format!("، الموضع {}", numbers(positions)));
    }

    match rule.skip {
        SkipPolicy::Omit => {}
        SkipPolicy::Forward => out.push_str("، مع ترحيل الأيام غير الموجودة إلى الشهر التالي"),
        SkipPolicy::Backward => out.push_str("، مع إرجاع الأيام غير الموجودة إلى آخر الشهر"),
    }

    match (rule.count, rule.until) {
        (Some(1), _) => out.push_str("، مرة واحدة"),
        (Some(count), _) => out.push_str(&format!("، {count} مرات")),
        (None, Some(until)) => out.push_str(&format!("، حتى {until}")),
        (None, None) => {}
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hilal_calendar::{LunarDate, TabularCalendar};
    use hilal_core::CalendarVariant;

    fn rule(freq: Frequency) -> NormalizedRule {
        let start = LunarDate::new(1446, 9, 1, &TabularCalendar::new()).unwrap();
        NormalizedRule::new(freq, start, CalendarVariant::Tabular)
    }

    #[test]
    fn yearly_ramadan() {
        let mut r = rule(Frequency::Yearly);
        r.by_month = Some(vec![9, 10]);
        r.count = Some(5);
        assert_eq!(render(&r), "كل سنة في رمضان وشوال، 5 مرات");
    }

    #[test]
    fn ordinal_weekdays() {
        let mut r = rule(Frequency::Monthly);
        r.by_weekday_nth = Some(vec![
            WeekdayNum::nth(1, Weekday::Friday),
            WeekdayNum::nth(-1, Weekday::Friday),
        ]);
        assert_eq!(render(&r), "كل شهر، أول جمعة وآخر جمعة");
    }

    #[test]
    fn interval_until() {
        let mut r = rule(Frequency::Weekly);
        r.interval = 2;
        r.by_weekday = Some(vec![Weekday::Friday]);
        r.until = Some(LunarDate::new(1447, 1, 1, &TabularCalendar::new()).unwrap());
        assert_eq!(render(&r), "كل 2 أسابيع، يوم الجمعة، حتى 1447-01-01");
    }
}

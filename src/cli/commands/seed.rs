use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use rand::Rng;

use crate::config::Config;
use crate::db::{SaveOutcome, Store};
use crate::domain::{Category, Frequency, NewHabit, NewHabitLog};

pub const DEMO_EMAIL: &str = "demo@example.com";
const DEMO_NAME: &str = "Demo User";
const DEMO_PASSWORD: &str = "password123";
const HISTORY_DAYS: i64 = 30;

struct SampleHabit {
    title: &'static str,
    description: &'static str,
    category: Category,
    time_of_day: &'static str,
    reminder_time: &'static str,
    completion_rate: f64,
}

const SAMPLE_HABITS: [SampleHabit; 4] = [
    SampleHabit {
        title: "Morning Exercise",
        description: "30 minutes of strength training and cardio",
        category: Category::Fitness,
        time_of_day: "06:00",
        reminder_time: "05:45",
        completion_rate: 0.85,
    },
    SampleHabit {
        title: "Meditation",
        description: "15 minutes mindfulness meditation",
        category: Category::Mindfulness,
        time_of_day: "07:00",
        reminder_time: "06:55",
        completion_rate: 0.75,
    },
    SampleHabit {
        title: "Code Review",
        description: "Review and refactor code for personal projects",
        category: Category::Career,
        time_of_day: "10:00",
        reminder_time: "09:55",
        completion_rate: 0.7,
    },
    SampleHabit {
        title: "Reading",
        description: "Read technical books or articles",
        category: Category::Learning,
        time_of_day: "21:00",
        reminder_time: "20:55",
        completion_rate: 0.8,
    },
];

/// One log per day from `start` through `today`, completed with probability
/// `rate` at a time within half an hour of `scheduled`.
fn plan_logs(
    rng: &mut impl Rng,
    scheduled: NaiveTime,
    rate: f64,
    start: NaiveDate,
    today: NaiveDate,
) -> Vec<NewHabitLog> {
    start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|date| {
            let completed = rng.random_bool(rate);
            let completion_time = completed.then(|| {
                let offset = Duration::minutes(rng.random_range(-30..=30));
                scheduled.overflowing_add_signed(offset).0
            });
            let notes = completion_time.map_or_else(
                || "Missed today's habit".to_string(),
                |t| format!("Completed at {}", t.format("%I:%M %p")),
            );
            NewHabitLog {
                date,
                completed,
                completion_time,
                notes: Some(notes),
            }
        })
        .collect()
}

/// Consecutive completed days ending on `yesterday`.
fn trailing_streak(logs: &[NewHabitLog], yesterday: NaiveDate) -> u32 {
    let mut expected = yesterday;
    let mut streak = 0;
    for log in logs.iter().rev().filter(|l| l.date <= yesterday) {
        if log.date != expected || !log.completed {
            break;
        }
        streak += 1;
        expected = expected - Duration::days(1);
    }
    streak
}

pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let Some(user) = store
        .create_user(DEMO_EMAIL, DEMO_NAME, DEMO_PASSWORD, &config.security)
        .await?
    else {
        println!("{DEMO_EMAIL} already exists, skipping.");
        return Ok(());
    };

    let now = Utc::now();
    let today = now.date_naive();
    let yesterday = today - Duration::days(1);
    let start = now - Duration::days(HISTORY_DAYS);

    for sample in &SAMPLE_HABITS {
        let scheduled = NaiveTime::parse_from_str(sample.time_of_day, "%H:%M")?;
        let logs = plan_logs(
            &mut rand::rng(),
            scheduled,
            sample.completion_rate,
            start.date_naive(),
            today,
        );

        let habit = store
            .create_habit(
                user.id,
                &NewHabit {
                    title: sample.title.to_string(),
                    description: sample.description.to_string(),
                    frequency: Frequency::Daily,
                    category: sample.category,
                    time_of_day: Some(sample.time_of_day.to_string()),
                    reminder_time: Some(sample.reminder_time.to_string()),
                },
                start,
            )
            .await?;

        for log in &logs {
            store.append_habit_log(habit.id, log).await?;
        }

        let last_done = logs
            .iter()
            .find(|l| l.date == yesterday && l.completed)
            .and_then(|l| l.completion_time.map(|t| l.date.and_time(t).and_utc()));

        if let Some(last_completed) = last_done {
            let mut seeded = habit.clone();
            seeded.streak = trailing_streak(&logs, yesterday);
            seeded.last_completed = Some(last_completed);
            if !matches!(store.save_habit(&seeded, now).await?, SaveOutcome::Saved(_)) {
                anyhow::bail!("Failed to record streak for '{}'", sample.title);
            }
        }

        println!(
            "✓ {} ({} days logged, {} completed)",
            sample.title,
            logs.len(),
            logs.iter().filter(|l| l.completed).count()
        );
    }

    println!("Sample data created. Log in as {DEMO_EMAIL} / {DEMO_PASSWORD}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn test_plan_logs_covers_every_day() {
        let mut rng = StdRng::seed_from_u64(7);
        let scheduled = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let logs = plan_logs(&mut rng, scheduled, 0.8, day(1), day(30));

        assert_eq!(logs.len(), 30);
        assert_eq!(logs.first().unwrap().date, day(1));
        assert_eq!(logs.last().unwrap().date, day(30));
        for log in &logs {
            assert_eq!(log.completed, log.completion_time.is_some());
            if let Some(t) = log.completion_time {
                let diff = (t - scheduled).num_minutes().abs();
                assert!(diff <= 30, "{t} too far from schedule");
            }
        }
    }

    #[test]
    fn test_plan_logs_rate_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        let scheduled = NaiveTime::from_hms_opt(21, 0, 0).unwrap();
        assert!(
            plan_logs(&mut rng, scheduled, 1.0, day(1), day(10))
                .iter()
                .all(|l| l.completed)
        );
        assert!(
            plan_logs(&mut rng, scheduled, 0.0, day(1), day(10))
                .iter()
                .all(|l| !l.completed)
        );
    }

    #[test]
    fn test_trailing_streak() {
        let log = |d: u32, completed: bool| NewHabitLog {
            date: day(d),
            completed,
            completion_time: None,
            notes: None,
        };
        let logs = vec![
            log(1, true),
            log(2, false),
            log(3, true),
            log(4, true),
            log(5, true),
            log(6, false),
        ];
        assert_eq!(trailing_streak(&logs, day(5)), 3);
        assert_eq!(trailing_streak(&logs, day(6)), 0);
        assert_eq!(trailing_streak(&logs, day(1)), 1);
    }
}

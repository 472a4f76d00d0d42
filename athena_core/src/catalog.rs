//! Built-in catalog of workout sessions and multi-week programs.
//!
//! These are the static sessions the player falls back to when the
//! authoring service has nothing, and the programs the tracker follows.

use crate::types::*;
use once_cell::sync::Lazy;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Sessions and programs known to the player
#[derive(Clone, Debug)]
pub struct Catalog {
    pub sessions: Vec<Session>,
    pub programs: Vec<Program>,
}

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Build the default catalog from scratch
///
/// Prefer `get_default_catalog()` outside of tests.
pub fn build_default_catalog() -> Catalog {
    Catalog {
        sessions: default_sessions(),
        programs: default_programs(),
    }
}

fn ex(name: &str, duration_seconds: u32) -> Exercise {
    Exercise::new(name, duration_seconds)
}

fn default_sessions() -> Vec<Session> {
    vec![
        Session {
            name: "Full Body Ignition".into(),
            description: "A balanced, full-body workout to build strength and endurance. \
                          Perfect for all fitness levels."
                .into(),
            intensity: Intensity::Medium,
            blocks: vec![
                Block::new(
                    BlockPhase::Warmup,
                    vec![
                        ex("Jumping Jacks", 30),
                        ex("High Knees", 30),
                        ex("Arm Circles", 20),
                    ],
                ),
                Block::new(
                    BlockPhase::Work,
                    vec![
                        ex("Bodyweight Squats", 40),
                        ex("Push-ups", 40),
                        ex("Alternating Lunges", 40),
                        ex("Plank", 40),
                    ],
                )
                .with_rounds(3, 45),
                Block::new(
                    BlockPhase::Cooldown,
                    vec![
                        ex("Quad Stretch", 30),
                        ex("Hamstring Stretch", 30),
                        ex("Child's Pose", 45),
                    ],
                ),
            ],
        },
        Session {
            name: "HIIT Blast".into(),
            description: "A high-intensity interval session to maximize calorie burn and \
                          elevate your cardiovascular fitness."
                .into(),
            intensity: Intensity::High,
            blocks: vec![
                Block::new(
                    BlockPhase::Warmup,
                    vec![ex("Butt Kicks", 30), ex("Fast Feet", 30)],
                ),
                Block::new(
                    BlockPhase::Work,
                    vec![
                        ex("Burpees", 30),
                        ex("Mountain Climbers", 30),
                        ex("Jump Squats", 30),
                    ],
                )
                .with_rounds(4, 30),
                Block::new(
                    BlockPhase::Cooldown,
                    vec![ex("Deep Breathing", 60), ex("Full Body Stretch", 60)],
                ),
            ],
        },
        Session {
            name: "Core Crusher".into(),
            description: "A focused session to build a strong, stable core. Engage your abs, \
                          obliques, and lower back."
                .into(),
            intensity: Intensity::Medium,
            blocks: vec![
                Block::new(
                    BlockPhase::Warmup,
                    vec![ex("Torso Twists", 30), ex("Cat-Cow Stretch", 45)],
                ),
                Block::new(
                    BlockPhase::Work,
                    vec![
                        ex("Crunches", 45),
                        ex("Leg Raises", 45),
                        ex("Russian Twists", 45),
                        ex("Bird-Dog Crunches", 45),
                    ],
                )
                .with_rounds(3, 30),
                Block::new(
                    BlockPhase::Cooldown,
                    vec![ex("Cobra Stretch", 45), ex("Spinal Twist", 60)],
                ),
            ],
        },
        Session {
            name: "Cardio Surge".into(),
            description: "A pure cardio workout to get your heart rate up and improve your \
                          endurance. No equipment needed."
                .into(),
            intensity: Intensity::High,
            blocks: vec![
                Block::new(
                    BlockPhase::Warmup,
                    vec![ex("Light Jog in Place", 60), ex("Side Shuffles", 45)],
                ),
                Block::new(
                    BlockPhase::Work,
                    vec![
                        ex("High Knees", 30),
                        ex("Jumping Jacks", 30),
                        ex("Fast Feet", 30),
                    ],
                )
                .with_rounds(5, 20),
                Block::new(
                    BlockPhase::Cooldown,
                    vec![ex("Walk in Place", 90), ex("Calf Stretches", 60)],
                ),
            ],
        },
        Session {
            name: "Mindful Mobility".into(),
            description: "A gentle, low-impact session focused on improving flexibility, \
                          balance, and mind-body connection."
                .into(),
            intensity: Intensity::Low,
            blocks: vec![
                Block::new(
                    BlockPhase::Warmup,
                    vec![ex("Neck Rolls", 45), ex("Shoulder Shrugs", 45)],
                ),
                Block::new(
                    BlockPhase::Work,
                    vec![
                        ex("Cat-Cow Pose", 60),
                        ex("Downward Dog", 60),
                        ex("Warrior II", 45),
                        ex("Triangle Pose", 45),
                    ],
                ),
                Block::new(
                    BlockPhase::Cooldown,
                    vec![ex("Seated Forward Bend", 60), ex("Savasana", 120)],
                ),
            ],
        },
    ]
}

fn week(number: u32, days: [(WorkoutGoal, &str); 3]) -> ProgramWeek {
    ProgramWeek {
        week: number,
        days: days
            .iter()
            .enumerate()
            .map(|(i, (goal, title))| ProgramDay {
                day: i as u32 + 1,
                goal: DayGoal::Train(*goal),
                title: (*title).to_string(),
            })
            .collect(),
    }
}

fn default_programs() -> Vec<Program> {
    use WorkoutGoal::*;

    vec![
        Program {
            id: "fat-burn-challenge-4w".into(),
            name: "4-Week Fat Burn Challenge".into(),
            description: "A progressive 4-week program designed to maximize calorie burn, \
                          boost metabolism, and improve cardiovascular endurance through a \
                          combination of HIIT and full-body strength workouts."
                .into(),
            duration_weeks: 4,
            weeks: vec![
                week(
                    1,
                    [
                        (Cardio, "Cardio Foundation"),
                        (Strength, "Full Body Strength"),
                        (Cardio, "Endurance Builder"),
                    ],
                ),
                week(
                    2,
                    [
                        (FatBurn, "HIIT Power"),
                        (Strength, "Strength & Stability"),
                        (Endurance, "Metabolic Surge"),
                    ],
                ),
                week(
                    3,
                    [
                        (Cardio, "Cardio Peak"),
                        (Strength, "Advanced Strength"),
                        (FatBurn, "Max Intensity HIIT"),
                    ],
                ),
                week(
                    4,
                    [
                        (Endurance, "Endurance Test"),
                        (Strength, "Total Body Power"),
                        (FatBurn, "Final Challenge"),
                    ],
                ),
            ],
        },
        Program {
            id: "strength-builder-4w".into(),
            name: "4-Week Strength Builder".into(),
            description: "Build foundational strength and improve functional movement with \
                          this 4-week progressive plan. Focuses on compound movements and \
                          controlled reps to increase your power."
                .into(),
            duration_weeks: 4,
            weeks: vec![
                week(
                    1,
                    [
                        (Strength, "Foundation Strength"),
                        (Mobility, "Active Recovery"),
                        (Strength, "Upper Body Focus"),
                    ],
                ),
                week(
                    2,
                    [
                        (Strength, "Lower Body Power"),
                        (Mobility, "Mobility Flow"),
                        (Strength, "Core & Push Strength"),
                    ],
                ),
                week(
                    3,
                    [
                        (Strength, "Full Body Complex"),
                        (Mobility, "Dynamic Stretching"),
                        (Strength, "Pull & Hinge Day"),
                    ],
                ),
                week(
                    4,
                    [
                        (Strength, "Strength Endurance"),
                        (Mobility, "Restorative Mobility"),
                        (Strength, "Performance Test"),
                    ],
                ),
            ],
        },
    ]
}

impl Catalog {
    /// Find a session by name, ignoring case
    pub fn find_session(&self, name: &str) -> Option<&Session> {
        let wanted = name.trim().to_lowercase();
        self.sessions
            .iter()
            .find(|s| s.name.to_lowercase() == wanted)
    }

    pub fn find_program(&self, id: &str) -> Option<&Program> {
        self.programs.iter().find(|p| p.id == id)
    }

    /// Built-in session that best matches a training goal
    pub fn fallback_for_goal(&self, goal: WorkoutGoal) -> Option<&Session> {
        let name = match goal {
            WorkoutGoal::Strength => "Full Body Ignition",
            WorkoutGoal::FatBurn => "HIIT Blast",
            WorkoutGoal::Cardio | WorkoutGoal::Endurance => "Cardio Surge",
            WorkoutGoal::Flexibility | WorkoutGoal::Mobility => "Mindful Mobility",
        };
        self.find_session(name).or_else(|| self.sessions.first())
    }

    /// Validate the catalog and return any errors
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.sessions.is_empty() {
            errors.push("Catalog has no sessions".to_string());
        }

        for session in &self.sessions {
            if let Err(e) = session.validate() {
                errors.push(e.to_string());
            }
        }

        for program in &self.programs {
            if program.weeks.len() != program.duration_weeks as usize {
                errors.push(format!(
                    "Program {} lists {} weeks but lasts {}",
                    program.id,
                    program.weeks.len(),
                    program.duration_weeks
                ));
            }
            for week in &program.weeks {
                if week.training_days() == 0 {
                    errors.push(format!(
                        "Program {} week {} has no training days",
                        program.id, week.week
                    ));
                }
            }
        }

        errors
    }
}

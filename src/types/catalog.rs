//! Sample catalog entries served by the list endpoints

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Workout {
    pub id: u32,
    pub name: &'static str,
    pub duration_min: u32,
    pub difficulty: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meal {
    pub id: u32,
    pub name: &'static str,
    pub calories: u32,
}

// Static samples until a catalog store exists.

pub const SAMPLE_WORKOUTS: [Workout; 2] = [
    Workout {
        id: 1,
        name: "Full Body Beginner",
        duration_min: 45,
        difficulty: "Beginner",
    },
    Workout {
        id: 2,
        name: "HIIT Advanced",
        duration_min: 30,
        difficulty: "Advanced",
    },
];

pub const SAMPLE_MEALS: [Meal; 2] = [
    Meal {
        id: 1,
        name: "Chicken Salad",
        calories: 400,
    },
    Meal {
        id: 2,
        name: "Oatmeal and Fruit",
        calories: 350,
    },
];

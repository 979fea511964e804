//! Templestay programs and reservations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::content::{require, Board, Record, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplestayProgram {
    pub id: String,
    pub name: String,
    pub description: String,
    pub duration: String,
    pub price: String,
    pub capacity: u32,
    pub schedule: String,
    pub status: ProgramStatus,
}

impl Record for TemplestayProgram {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        require(&self.duration, "duration")?;
        if self.capacity == 0 {
            return Err(ValidationError::MissingField("capacity"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Pending,
    Cancelled,
}

impl ReservationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReservationStatus::Confirmed => "확정",
            ReservationStatus::Pending => "대기",
            ReservationStatus::Cancelled => "취소",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "confirm" | "confirmed" => Some(ReservationStatus::Confirmed),
            "pending" => Some(ReservationStatus::Pending),
            "cancel" | "cancelled" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub program: String,
    pub name: String,
    pub date: NaiveDate,
    pub people: u32,
    pub status: ReservationStatus,
    pub phone: String,
    pub email: String,
}

impl Record for Reservation {
    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.program, "program")?;
        require(&self.name, "name")?;
        if self.people == 0 {
            return Err(ValidationError::MissingField("people"));
        }
        Ok(())
    }
}

impl Board<TemplestayProgram> {
    /// Flip between active and inactive; returns the new status.
    pub fn toggle_status(&mut self, id: &str) -> Option<ProgramStatus> {
        let program = self.get_mut(id)?;
        program.status = match program.status {
            ProgramStatus::Active => ProgramStatus::Inactive,
            ProgramStatus::Inactive => ProgramStatus::Active,
        };
        Some(program.status)
    }

    pub fn active(&self) -> impl Iterator<Item = &TemplestayProgram> {
        self.iter()
            .filter(|program| program.status == ProgramStatus::Active)
    }
}

impl Board<Reservation> {
    pub fn set_status(&mut self, id: &str, status: ReservationStatus) -> Option<ReservationStatus> {
        let reservation = self.get_mut(id)?;
        reservation.status = status;
        Some(status)
    }

    pub fn count_with(&self, status: ReservationStatus) -> usize {
        self.iter()
            .filter(|reservation| reservation.status == status)
            .count()
    }
}

struct ProgramSeed {
    name: &'static str,
    description: &'static str,
    duration: &'static str,
    price: &'static str,
    capacity: u32,
    schedule: &'static str,
    status: ProgramStatus,
}

const PROGRAMS: &[ProgramSeed] = &[
    ProgramSeed {
        name: "휴식형 템플스테이",
        description: "사찰의 일상을 체험하며 마음의 휴식을 찾는 프로그램입니다. 새벽예불, 108배, 발우공양, 차담 등이 포함됩니다.",
        duration: "1박 2일",
        price: "80,000원",
        capacity: 20,
        schedule: "매주 토-일",
        status: ProgramStatus::Active,
    },
    ProgramSeed {
        name: "체험형 템플스테이",
        description: "108배, 발우공양, 명상, 산책 등 다양한 체험을 통해 불교의 가르침을 배우는 프로그램입니다.",
        duration: "2박 3일",
        price: "150,000원",
        capacity: 15,
        schedule: "매월 첫째, 셋째 주말",
        status: ProgramStatus::Active,
    },
    ProgramSeed {
        name: "명상 집중 템플스테이",
        description: "참선과 명상에 집중하는 프로그램으로, 자신의 내면을 들여다보는 시간을 가집니다.",
        duration: "3박 4일",
        price: "200,000원",
        capacity: 10,
        schedule: "매월 둘째 주 목-일",
        status: ProgramStatus::Inactive,
    },
];

// (program, name, date, people, status, phone, email)
type ReservationSeed = (
    &'static str,
    &'static str,
    (i32, u32, u32),
    u32,
    ReservationStatus,
    &'static str,
    &'static str,
);

const RESERVATIONS: &[ReservationSeed] = &[
    ("휴식형 템플스테이", "김신도", (2024, 6, 15), 2, ReservationStatus::Confirmed, "010-1234-5678", "kim@example.com"),
    ("체험형 템플스테이", "이불자", (2024, 6, 22), 1, ReservationStatus::Pending, "010-2345-6789", "lee@example.com"),
    ("휴식형 템플스테이", "박보살", (2024, 6, 29), 3, ReservationStatus::Confirmed, "010-3456-7890", "park@example.com"),
    ("명상 집중 템플스테이", "최수행", (2024, 7, 11), 1, ReservationStatus::Cancelled, "010-4567-8901", "choi@example.com"),
];

/// Board with the temple's standing programs.
pub fn seeded_programs() -> Board<TemplestayProgram> {
    let mut board = Board::new();
    for (index, seed) in PROGRAMS.iter().enumerate() {
        let program = TemplestayProgram {
            id: (index + 1).to_string(),
            name: seed.name.to_string(),
            description: seed.description.to_string(),
            duration: seed.duration.to_string(),
            price: seed.price.to_string(),
            capacity: seed.capacity,
            schedule: seed.schedule.to_string(),
            status: seed.status,
        };
        if let Err(e) = board.upsert(program) {
            log::warn!("Skipping templestay program '{}': {}", seed.name, e);
        }
    }
    board
}

/// Board with the sample reservations.
pub fn seeded_reservations() -> Board<Reservation> {
    let mut board = Board::new();
    for (index, &(program, name, (y, m, d), people, status, phone, email)) in
        RESERVATIONS.iter().enumerate()
    {
        let Some(date) = NaiveDate::from_ymd_opt(y, m, d) else {
            continue;
        };
        let reservation = Reservation {
            id: (index + 1).to_string(),
            program: program.to_string(),
            name: name.to_string(),
            date,
            people,
            status,
            phone: phone.to_string(),
            email: email.to_string(),
        };
        if let Err(e) = board.upsert(reservation) {
            log::warn!("Skipping reservation for '{}': {}", name, e);
        }
    }
    board
}

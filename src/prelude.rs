pub use crate::attack::{AttackModifiers, AttackPool, Strike, SurgeMode};
pub use crate::calc::{
    compute_attack_distribution, compute_defense_distribution, compute_wounds_distribution,
    Calculator, Strategy,
};
pub use crate::defense::{DefensePool, DefenseSurge};
pub use crate::defs::{AttackDie, DefenseDie};
pub use crate::report::ReportExt;
pub use crate::results::{AttackResults, DefenseResults, Entry, JointEntry, WoundsResults};
pub use crate::wounds::{Cover, DefenseModifiers};
pub use crate::{Amount, Dist};

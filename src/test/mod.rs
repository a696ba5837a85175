
pub(crate) use words::brute_force;

pub mod ses;
pub mod smtp;

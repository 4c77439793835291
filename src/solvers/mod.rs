pub mod rad_rk2;

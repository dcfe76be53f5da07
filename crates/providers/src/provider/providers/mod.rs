pub mod anikoto;

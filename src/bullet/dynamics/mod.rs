pub mod rigid_body;

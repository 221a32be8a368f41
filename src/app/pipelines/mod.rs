pub mod address_pipeline;

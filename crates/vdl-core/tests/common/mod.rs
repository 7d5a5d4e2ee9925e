pub mod mock_adapter;

pub mod temporal_graph;

mod arguments;
mod defer;
mod document;
mod fragments;
mod merging;
mod navigation;
mod testkit;
